use crate::error::Result;
use crate::models::transaction::{Transaction, TransactionType};
use crate::operations::balance::{Balance, compute_balance, monthly_report};
use crate::operations::category::{group_by_category, sorted_category_totals};
use crate::operations::chart::{ChartSlice, chart_slices, slice_angles};
use crate::operations::limit::{LimitState, LimitStatus, limit_status};
use chrono::NaiveDate;
use crossterm::{
    event::{self, Event, KeyCode},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::widgets::canvas::{Canvas, Points};
use ratatui::{
    prelude::{Alignment, Color, Constraint, Direction, Layout, Rect, Style},
    style::Modifier,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
};
use rust_decimal::Decimal;
use std::io;

const PALETTE: [Color; 7] = [
    Color::Red,
    Color::Blue,
    Color::Yellow,
    Color::Magenta,
    Color::Cyan,
    Color::Green,
    Color::Gray,
];

pub struct AnalysisData {
    pub chart_type: TransactionType,
    pub balance: Balance,
    pub limit: Decimal,
    pub limit_status: LimitStatus,
    pub monthly: Option<Balance>,
    pub slices: Vec<ChartSlice>,
    pub category_totals: Vec<(String, Decimal)>,
}

pub fn build_analysis(
    transactions: &[Transaction],
    limit: Decimal,
    chart_type: TransactionType,
    today: NaiveDate,
) -> AnalysisData {
    let balance = compute_balance(transactions);
    AnalysisData {
        chart_type,
        balance,
        limit,
        limit_status: limit_status(balance.expense, limit),
        monthly: monthly_report(transactions, today),
        slices: chart_slices(&group_by_category(transactions, chart_type)),
        category_totals: sorted_category_totals(transactions, chart_type),
    }
}

/// One-line description of the limit status, as shown under the balance.
pub fn describe_limit(expense: Decimal, limit: Decimal, status: &LimitStatus) -> String {
    match status.state {
        LimitState::Unset => "No expense limit set".to_string(),
        state => {
            let mut text = format!("Spent {} of {} ({:.1}%)", expense, limit, status.percent);
            match state {
                LimitState::Exceeded => text.push_str("  Limit exceeded!"),
                LimitState::Near => text.push_str("  Limit almost reached!"),
                _ => {}
            }
            text
        }
    }
}

fn limit_color(state: LimitState) -> Color {
    match state {
        LimitState::Unset => Color::White,
        LimitState::Ok => Color::Green,
        LimitState::Near => Color::Yellow,
        LimitState::Exceeded => Color::Red,
    }
}

pub fn run_analysis(data: &AnalysisData) -> Result<()> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;

    let result = (|| -> Result<()> {
        let backend = ratatui::backend::CrosstermBackend::new(stdout);
        let mut terminal = ratatui::Terminal::new(backend)?;

        loop {
            terminal.draw(|frame| {
                let size = frame.area();
                let layout = Layout::default()
                    .direction(Direction::Vertical)
                    .constraints([Constraint::Length(7), Constraint::Min(5)])
                    .split(size);

                render_summary(frame, layout[0], data);

                let bottom = Layout::default()
                    .direction(Direction::Horizontal)
                    .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
                    .split(layout[1]);

                render_pie_chart(frame, bottom[0], data);
                render_category_table(frame, bottom[1], data);
            })?;

            if event::poll(std::time::Duration::from_millis(250))? {
                match event::read()? {
                    Event::Key(key) if key.code == KeyCode::Char('q') => break,
                    Event::Key(key) if key.code == KeyCode::Esc => break,
                    _ => {}
                }
            }
        }

        Ok(())
    })();

    disable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, LeaveAlternateScreen)?;

    result
}

fn render_summary(frame: &mut ratatui::Frame, area: Rect, data: &AnalysisData) {
    let block = Block::default()
        .title("Balance  (press q to exit)")
        .borders(Borders::ALL);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let monthly = match &data.monthly {
        Some(report) => format!(
            "This month: income {}  expense {}  balance {}",
            report.income, report.expense, report.balance
        ),
        None => "No data for the current month".to_string(),
    };

    let lines = vec![
        Line::from(format!("Income:  {}", data.balance.income)),
        Line::from(format!("Expense: {}", data.balance.expense)),
        Line::from(format!("Balance: {}", data.balance.balance)),
        Line::from(Span::styled(
            describe_limit(data.balance.expense, data.limit, &data.limit_status),
            Style::default().fg(limit_color(data.limit_status.state)),
        )),
        Line::from(monthly),
    ];
    frame.render_widget(Paragraph::new(lines).alignment(Alignment::Left), inner);
}

fn render_pie_chart(frame: &mut ratatui::Frame, area: Rect, data: &AnalysisData) {
    let title = format!("Share by category ({})", data.chart_type);
    let block = Block::default().title(title).borders(Borders::ALL);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    if data.slices.is_empty() {
        let empty = Paragraph::new("No data").alignment(Alignment::Center);
        frame.render_widget(empty, inner);
        return;
    }

    let angles = slice_angles(&data.slices);
    let canvas = Canvas::default()
        .x_bounds([-1.0, 1.0])
        .y_bounds([-1.0, 1.0])
        .paint(|ctx| {
            let step = 0.04;
            for (slice, (start, end)) in data.slices.iter().zip(angles.iter()) {
                let color = PALETTE[slice.color_index % PALETTE.len()];
                let mut points = Vec::new();
                let mut r = 0.0; // radius 0 center ... 1 edge
                while r <= 1.0 {
                    let mut angle = *start;
                    while angle <= *end {
                        // canvas y grows upwards, screen angles grow clockwise
                        points.push((r * angle.cos(), -r * angle.sin()));
                        angle += 0.05;
                    }
                    r += step;
                }
                if !points.is_empty() {
                    ctx.draw(&Points { coords: &points, color });
                }
            }
        });

    frame.render_widget(canvas, inner);
}

fn render_category_table(frame: &mut ratatui::Frame, area: Rect, data: &AnalysisData) {
    let block = Block::default().title("Categories").borders(Borders::ALL);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    if data.category_totals.is_empty() {
        let empty = Paragraph::new("No data").alignment(Alignment::Center);
        frame.render_widget(empty, inner);
        return;
    }

    let bold = Style::default().fg(Color::White).add_modifier(Modifier::BOLD);
    let mut lines = vec![Line::from(vec![
        Span::styled("Category", bold),
        Span::raw("  "),
        Span::styled("Amount", bold),
    ])];

    for (category, amount) in &data.category_totals {
        let color = data
            .slices
            .iter()
            .find(|slice| slice.label == *category)
            .map(|slice| PALETTE[slice.color_index % PALETTE.len()])
            .unwrap_or(Color::White);
        lines.push(Line::from(vec![
            Span::styled(format!("{:15}", category), Style::default().fg(color)),
            Span::raw("  "),
            Span::styled(format!("{:>12}", amount), Style::default().fg(color)),
        ]));
    }

    frame.render_widget(Paragraph::new(lines).alignment(Alignment::Left), inner);
}
