//! The dashboard view: one fetch of the summary, rendered to HTML with ECharts options.

use std::sync::Arc;

use charming::{
    Chart,
    component::{Axis, Grid, Legend, Title},
    element::{AxisType, Tooltip, Trigger},
    series::{Line, Pie},
};
use maud::{Markup, PreEscaped, html};

use crate::{
    BudgetVsActual, DashboardSummary, ExpenseBreakdown, TrendPoint,
    client::ApiClient,
};

/// Shown in place of the budget list when no budgets are set.
pub const NO_BUDGETS_TEXT: &str = "No budgets set for the current month.";

/// Shown in place of the expense chart when nothing was spent.
pub const NO_EXPENSES_TEXT: &str = "No expense data available for the current month.";

/// Shown in place of the trend chart when there are no transactions.
pub const NO_TREND_TEXT: &str = "No trend data available.";

/// Marks a budget row whose spending is over the limit.
pub const OVER_BUDGET_MARKER: &str = "(Over Budget)";

/// Where the dashboard is in its single fetch.
#[derive(Debug, Clone, PartialEq)]
pub enum DashboardState {
    /// The summary has not arrived yet.
    Loading,
    /// The fetch failed with this message.
    Failed(String),
    /// The summary arrived.
    Ready(DashboardSummary),
}

/// The dashboard page. The summary is never cached: [DashboardView::load] refetches it.
pub struct DashboardView {
    client: Arc<ApiClient>,
    state: DashboardState,
}

impl DashboardView {
    /// A view in the loading state.
    pub fn new(client: Arc<ApiClient>) -> Self {
        Self {
            client,
            state: DashboardState::Loading,
        }
    }

    /// The current state.
    pub fn state(&self) -> &DashboardState {
        &self.state
    }

    /// Fetch the summary. Without a bearer token the view stays loading.
    pub async fn load(&mut self) {
        self.state = DashboardState::Loading;

        match self.client.get_dashboard().await {
            Ok(Some(summary)) => self.state = DashboardState::Ready(summary),
            Ok(None) => {}
            Err(error) => {
                tracing::error!("Error fetching dashboard data: {error:?}");
                self.state = DashboardState::Failed(error.to_string());
            }
        }
    }

    /// Render the current state.
    pub fn render(&self) -> Markup {
        render_dashboard(&self.state)
    }
}

/// Render a dashboard state as HTML.
pub fn render_dashboard(state: &DashboardState) -> Markup {
    match state {
        DashboardState::Loading => html!(div { "Loading dashboard..." }),
        DashboardState::Failed(message) => {
            html!(div class="error" { "Error loading dashboard: " (message) })
        }
        DashboardState::Ready(summary) => summary_view(summary),
    }
}

fn summary_view(summary: &DashboardSummary) -> Markup {
    html!(
        div id="dashboard" {
            h2 { "Dashboard" }
            div class="dashboard-overview" {
                h3 { "Financial Overview" }
                (overview_item("Total Income:", summary.total_income))
                (overview_item("Total Expenses:", summary.total_expenses))
                (overview_item("Balance:", summary.balance))
            }
            div class="charts" {
                @if summary.expense_breakdown.is_empty() {
                    p { (NO_EXPENSES_TEXT) }
                } @else {
                    (chart_view("expense-breakdown-chart", &expense_breakdown_chart(&summary.expense_breakdown)))
                }
                @if summary.trend_data.is_empty() {
                    p { (NO_TREND_TEXT) }
                } @else {
                    (chart_view("trend-chart", &trend_chart(&summary.trend_data)))
                }
            }
            h3 { "Budget vs Actual Spending (Current Month)" }
            ul id="budget-vs-actual" {
                @for row in &summary.budget_vs_actual {
                    (budget_row(row))
                }
                @if summary.budget_vs_actual.is_empty() {
                    li { (NO_BUDGETS_TEXT) }
                }
            }
        }
    )
}

fn overview_item(label: &str, amount: f64) -> Markup {
    html!(
        div class="overview-item" {
            span { (label) }
            span { (format_currency(amount)) }
        }
    )
}

fn budget_row(row: &BudgetVsActual) -> Markup {
    html!(
        li {
            (row.category) ": Budgeted " (format_currency(row.limit))
            ", Spent " (format_currency(row.spent))
            @if row.is_over_budget() {
                span class="over-budget" { " " (OVER_BUDGET_MARKER) }
            }
        }
    )
}

fn chart_view(id: &str, chart: &Chart) -> Markup {
    let script = format!(
        "echarts.init(document.getElementById(\"{id}\")).setOption({});",
        chart
    );

    html!(
        div id=(id) class="chart" {}
        script { (PreEscaped(script)) }
    )
}

fn format_currency(amount: f64) -> String {
    if amount < 0.0 {
        format!("-${:.2}", amount.abs())
    } else {
        format!("${amount:.2}")
    }
}

/// A pie chart of this month's expenses per category.
pub fn expense_breakdown_chart(breakdown: &[ExpenseBreakdown]) -> Chart {
    let data: Vec<(f64, &str)> = breakdown
        .iter()
        .map(|item| (item.amount, item.category.as_str()))
        .collect();

    Chart::new()
        .title(Title::new().text("Expense Breakdown"))
        .tooltip(Tooltip::new().trigger(Trigger::Item))
        .legend(Legend::new().top("bottom"))
        .series(Pie::new().name("Expenses").radius("60%").data(data))
}

/// A line chart of the running balance over this month.
pub fn trend_chart(trend: &[TrendPoint]) -> Chart {
    let labels: Vec<String> = trend.iter().map(|point| point.date.to_string()).collect();
    let values: Vec<f64> = trend.iter().map(|point| point.balance).collect();

    Chart::new()
        .title(Title::new().text("Balance Trend"))
        .tooltip(Tooltip::new().trigger(Trigger::Axis))
        .grid(
            Grid::new()
                .left("3%")
                .right("4%")
                .bottom("3%")
                .contain_label(true),
        )
        .x_axis(Axis::new().type_(AxisType::Category).data(labels))
        .y_axis(Axis::new().type_(AxisType::Value))
        .series(Line::new().name("Balance").data(values))
}
