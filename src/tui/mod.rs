//! Ratatui-based terminal dashboard.
//!
//! The TUI mirrors the original report layout: headline metrics up top, a
//! price chart in the middle, and a settings panel for year selection, date
//! range, and forecast horizon. `f` fetches the trained model (once) and
//! overlays the forecast on the chart.

use std::collections::BTreeSet;
use std::io;
use std::time::Duration;

use chrono::{Datelike, NaiveDate};
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Clear, List, ListItem, Paragraph},
    Terminal,
};

use crate::app::pipeline::{load_dashboard_data, DashboardData};
use crate::cli::ReportArgs;
use crate::data::{ArtifactSource, FeedClient};
use crate::domain::{EnrichPolicy, EnrichedObservation, ForecastPoint};
use crate::error::AppError;
use crate::forecast::ForecastService;
use crate::report::HeadlineMetrics;

mod plotters_chart;

use plotters_chart::PricePlottersChart;

const DEFAULT_HORIZON_DAYS: i64 = 365;

/// Start the TUI.
pub fn run(args: ReportArgs) -> Result<(), AppError> {
    let _guard = TerminalGuard::new()?;

    let backend = CrosstermBackend::new(io::stdout());
    let mut terminal = Terminal::new(backend)
        .map_err(|e| AppError::new(4, format!("Failed to initialize terminal: {e}")))?;

    let mut app = App::new(args)?;
    app.event_loop(&mut terminal)
}

/// Ensures the terminal is restored (raw mode, alternate screen) on exit.
struct TerminalGuard;

impl TerminalGuard {
    fn new() -> Result<Self, AppError> {
        enable_raw_mode().map_err(|e| AppError::new(4, format!("Failed to enable raw mode: {e}")))?;
        if let Err(e) = execute!(io::stdout(), EnterAlternateScreen) {
            let _ = disable_raw_mode();
            return Err(AppError::new(4, format!("Failed to enter alternate screen: {e}")));
        }
        Ok(Self)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
    }
}

/// Which settings field is being edited as free text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EditTarget {
    StartDate,
    EndDate,
}

struct App {
    policy: EnrichPolicy,
    feed: FeedClient,
    model_url: Option<String>,

    data: Option<DashboardData>,

    // Filters (the "sidebar").
    years: BTreeSet<i32>,
    year_cursor: i32,
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
    horizon_days: i64,
    monthly_view: bool,

    // Forecast state: the model is fetched once and kept for the session.
    service: Option<ForecastService>,
    forecast: Option<Vec<ForecastPoint>>,

    selected_field: usize,
    editing: Option<EditTarget>,
    edit_input: String,
    status: String,
}

impl App {
    fn new(args: ReportArgs) -> Result<Self, AppError> {
        let policy = args.enrich_policy();
        let feed = FeedClient::from_env(args.feed_url.as_deref());
        let mut app = Self {
            year_cursor: policy.year_min,
            policy,
            feed,
            model_url: args.model_url,
            data: None,
            years: BTreeSet::new(),
            start: None,
            end: None,
            horizon_days: DEFAULT_HORIZON_DAYS,
            monthly_view: false,
            service: None,
            forecast: None,
            selected_field: 0,
            editing: None,
            edit_input: String::new(),
            status: "Fetching Brent feed...".to_string(),
        };
        app.refresh_feed()?;
        Ok(app)
    }

    fn event_loop<B: ratatui::backend::Backend>(
        &mut self,
        terminal: &mut Terminal<B>,
    ) -> Result<(), AppError> {
        let mut needs_redraw = true;
        loop {
            if needs_redraw {
                terminal
                    .draw(|f| self.draw(f))
                    .map_err(|e| AppError::new(4, format!("Terminal draw error: {e}")))?;
                needs_redraw = false;
            }

            if !event::poll(Duration::from_millis(100))
                .map_err(|e| AppError::new(4, format!("Event poll error: {e}")))?
            {
                continue;
            }

            match event::read().map_err(|e| AppError::new(4, format!("Event read error: {e}")))? {
                Event::Key(key) => {
                    if key.kind != KeyEventKind::Press {
                        continue;
                    }
                    if self.handle_key(key.code)? {
                        break;
                    }
                    needs_redraw = true;
                }
                Event::Resize(_, _) => {
                    needs_redraw = true;
                }
                _ => {}
            }
        }
        Ok(())
    }

    fn handle_key(&mut self, code: KeyCode) -> Result<bool, AppError> {
        if self.editing.is_some() {
            return self.handle_edit(code);
        }

        match code {
            KeyCode::Char('q') => return Ok(true),
            KeyCode::Up => {
                if self.selected_field > 0 {
                    self.selected_field -= 1;
                }
            }
            KeyCode::Down => {
                if self.selected_field < 3 {
                    self.selected_field += 1;
                }
            }
            KeyCode::Left => self.adjust_field(-1),
            KeyCode::Right => self.adjust_field(1),
            KeyCode::Enter => match self.selected_field {
                0 => self.toggle_year(),
                1 => self.begin_edit(EditTarget::StartDate),
                2 => self.begin_edit(EditTarget::EndDate),
                _ => {}
            },
            KeyCode::Char('r') => {
                self.refresh_feed()?;
            }
            KeyCode::Char('m') => {
                self.monthly_view = !self.monthly_view;
                self.status = if self.monthly_view {
                    "Showing monthly closes.".to_string()
                } else {
                    "Showing daily series.".to_string()
                };
            }
            KeyCode::Char('f') => {
                self.run_forecast();
            }
            KeyCode::Char('c') => {
                self.forecast = None;
                self.status = "Forecast overlay cleared.".to_string();
            }
            _ => {}
        }

        Ok(false)
    }

    fn handle_edit(&mut self, code: KeyCode) -> Result<bool, AppError> {
        match code {
            KeyCode::Esc => {
                self.editing = None;
                self.status = "Date edit canceled.".to_string();
            }
            KeyCode::Enter => {
                self.apply_edit();
            }
            KeyCode::Backspace => {
                self.edit_input.pop();
            }
            KeyCode::Char(c) => {
                if c.is_ascii_digit() || c == '-' {
                    self.edit_input.push(c);
                }
            }
            _ => {}
        }
        Ok(false)
    }

    fn begin_edit(&mut self, target: EditTarget) {
        let current = match target {
            EditTarget::StartDate => self.start,
            EditTarget::EndDate => self.end,
        };
        self.edit_input = current.map(|d| d.to_string()).unwrap_or_default();
        self.editing = Some(target);
        self.status = "Editing date (YYYY-MM-DD). Enter to apply, Esc to cancel, empty = full range.".to_string();
    }

    fn apply_edit(&mut self) {
        let Some(target) = self.editing.take() else {
            return;
        };

        let trimmed = self.edit_input.trim();
        let parsed = if trimmed.is_empty() {
            None
        } else {
            match NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
                Ok(d) => Some(d),
                Err(e) => {
                    self.status = format!("Invalid date '{trimmed}': {e}");
                    return;
                }
            }
        };

        match target {
            EditTarget::StartDate => self.start = parsed,
            EditTarget::EndDate => self.end = parsed,
        }
        self.status = "Date range updated.".to_string();
    }

    fn adjust_field(&mut self, delta: i64) {
        match self.selected_field {
            0 => {
                let next = self.year_cursor + delta as i32;
                self.year_cursor = next.clamp(self.policy.year_min, self.policy.year_max);
            }
            3 => {
                let next = self.horizon_days + delta * 30;
                self.horizon_days = next.max(1);
                self.status = format!("horizon: {} days", self.horizon_days);
            }
            _ => {}
        }
    }

    fn toggle_year(&mut self) {
        let year = self.year_cursor;
        if !self.years.remove(&year) {
            self.years.insert(year);
        }
        // An empty set is an explicit "no restriction" state.
        self.status = if self.years.is_empty() {
            "Years: all (no restriction).".to_string()
        } else {
            format!(
                "Years: {}",
                self.years
                    .iter()
                    .map(|y| y.to_string())
                    .collect::<Vec<_>>()
                    .join(", ")
            )
        };
    }

    fn refresh_feed(&mut self) -> Result<(), AppError> {
        self.status = "Fetching Brent feed...".to_string();
        let data = load_dashboard_data(&self.feed, &self.policy)?;
        self.status = format!(
            "Feed: {} rows used, {} rejected, last update {}.",
            data.stats.n_rows,
            data.outcome.rows_rejected(),
            data.stats
                .date_max
                .map(|d| d.to_string())
                .unwrap_or_else(|| "-".to_string()),
        );
        self.data = Some(data);
        Ok(())
    }

    /// Fetch the model on first use, then predict. Load failures become a
    /// status-line message; the dashboard keeps working without a model.
    fn run_forecast(&mut self) {
        if self.service.is_none() {
            self.status = "Fetching forecasting model...".to_string();
            let source = ArtifactSource::from_env(self.model_url.as_deref());
            self.service = Some(ForecastService::load_or_degrade(&source));
        }

        let Some(service) = &self.service else {
            return;
        };

        match service.predict(self.horizon_days) {
            Ok(points) => {
                self.status = format!("Forecast: {} days.", points.len());
                self.forecast = Some(points);
            }
            Err(err) => {
                self.status = format!("Forecast unavailable: {err}");
                self.forecast = None;
            }
        }
    }

    /// Rows after the sidebar filters (date range + year set).
    fn filtered_rows(&self) -> Vec<EnrichedObservation> {
        let Some(data) = &self.data else {
            return Vec::new();
        };
        let start = self
            .start
            .or(data.stats.date_min)
            .unwrap_or(self.policy.date_floor);
        let end = self
            .end
            .or(data.stats.date_max)
            .unwrap_or(self.policy.date_floor);

        let rows = crate::transform::filter_range(&data.enriched, start, end, &self.years);
        if self.monthly_view {
            crate::transform::monthly_close(&rows)
        } else {
            rows
        }
    }

    fn draw(&mut self, frame: &mut ratatui::Frame<'_>) {
        let size = frame.area();
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(5), Constraint::Min(0), Constraint::Length(3)])
            .split(size);

        self.draw_header(frame, chunks[0]);
        self.draw_body(frame, chunks[1]);
        self.draw_footer(frame, chunks[2]);
    }

    fn draw_header(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let mut lines: Vec<Line> = Vec::new();
        lines.push(Line::from(vec![
            Span::styled("brent", Style::default().fg(Color::Cyan)),
            Span::raw(" — crude-oil price dashboard (Brent)"),
        ]));

        if let Some(data) = &self.data {
            let metrics = HeadlineMetrics::from_rows(&data.enriched);
            lines.push(Line::from(Span::styled(
                format!(
                    "last update: {} | last price: {} | prev-year mean: {} | rows: {} ({} rejected)",
                    metrics
                        .last_date
                        .map(|d| d.to_string())
                        .unwrap_or_else(|| "-".to_string()),
                    metrics
                        .last_price
                        .map(|p| format!("${p:.2}"))
                        .unwrap_or_else(|| "-".to_string()),
                    metrics
                        .prev_year_mean
                        .map(|p| format!("${p:.2}"))
                        .unwrap_or_else(|| "-".to_string()),
                    data.stats.n_rows,
                    data.outcome.rows_rejected(),
                ),
                Style::default().fg(Color::Gray),
            )));
        }

        let model_state = match &self.service {
            None => "not fetched".to_string(),
            Some(s) => match s.unavailable_reason() {
                None => "loaded".to_string(),
                Some(reason) => format!("unavailable ({reason})"),
            },
        };
        lines.push(Line::from(Span::styled(
            format!("model: {model_state}"),
            Style::default().fg(Color::Gray),
        )));

        let p = Paragraph::new(Text::from(lines)).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }

    fn draw_body(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(0), Constraint::Length(9)])
            .split(area);

        self.draw_chart(frame, chunks[0]);
        self.draw_settings(frame, chunks[1]);
    }

    fn draw_chart(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let title = if self.monthly_view {
            "Brent price (monthly close, USD)"
        } else {
            "Brent price (USD)"
        };
        let block = Block::default().title(title).borders(Borders::ALL);
        let inner = block.inner(area);
        frame.render_widget(block, area);
        frame.render_widget(Clear, inner);

        let rows = self.filtered_rows();
        if rows.is_empty() {
            let msg = Paragraph::new("Waiting for data...")
                .style(Style::default().fg(Color::Yellow))
                .block(Block::default());
            frame.render_widget(msg, inner);
            return;
        }

        let series = chart_series(&rows, self.forecast.as_deref());
        let widget = PricePlottersChart {
            history: &series.history,
            forecast: &series.forecast,
            band_lower: &series.band_lower,
            band_upper: &series.band_upper,
            x_bounds: series.x_bounds,
            y_bounds: series.y_bounds,
            x_label: "date",
            y_label: "USD",
            fmt_x: fmt_axis_date,
            fmt_y: fmt_axis_usd,
        };

        frame.render_widget(widget, inner);
    }

    fn draw_settings(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let years_label = if self.years.is_empty() {
            format!("all  (cursor: {})", self.year_cursor)
        } else {
            format!(
                "{}  (cursor: {})",
                self.years
                    .iter()
                    .map(|y| y.to_string())
                    .collect::<Vec<_>>()
                    .join(","),
                self.year_cursor
            )
        };

        let fmt_bound = |d: Option<NaiveDate>| {
            d.map(|d| d.to_string()).unwrap_or_else(|| "full".to_string())
        };

        let items = vec![
            ListItem::new(format!("Years: {years_label}")),
            ListItem::new(format!("Start: {}", fmt_bound(self.start))),
            ListItem::new(format!("End: {}", fmt_bound(self.end))),
            ListItem::new(format!("Horizon: {} days", self.horizon_days)),
        ];

        let list = List::new(items)
            .block(Block::default().title("Settings").borders(Borders::ALL))
            .highlight_style(Style::default().fg(Color::Black).bg(Color::White))
            .highlight_symbol("» ");

        let mut state = ratatui::widgets::ListState::default();
        state.select(Some(self.selected_field));
        frame.render_stateful_widget(list, area, &mut state);

        if self.editing.is_some() {
            let hint = Paragraph::new(format!("date: {}_", self.edit_input))
                .style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD));
            let rect = Rect {
                x: area.x + 2,
                y: area.y + area.height.saturating_sub(2),
                width: area.width.saturating_sub(4),
                height: 1,
            };
            frame.render_widget(hint, rect);
        }
    }

    fn draw_footer(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let help = "↑/↓ select  ←/→ adjust  Enter toggle/edit  f forecast  c clear  m monthly  r refresh  q quit";
        let line = Line::from(vec![
            Span::styled(help, Style::default().fg(Color::Gray)),
            Span::raw(" | "),
            Span::styled(&self.status, Style::default().fg(Color::Yellow)),
        ]);
        let p = Paragraph::new(line).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }
}

/// Chart-ready series: dates mapped to days-since-CE on the x axis.
struct ChartSeries {
    history: Vec<(f64, f64)>,
    forecast: Vec<(f64, f64)>,
    band_lower: Vec<(f64, f64)>,
    band_upper: Vec<(f64, f64)>,
    x_bounds: [f64; 2],
    y_bounds: [f64; 2],
}

fn chart_series(rows: &[EnrichedObservation], forecast: Option<&[ForecastPoint]>) -> ChartSeries {
    let to_x = |d: NaiveDate| d.num_days_from_ce() as f64;

    let history: Vec<(f64, f64)> = rows.iter().map(|r| (to_x(r.date), r.price)).collect();

    let mut forecast_line = Vec::new();
    let mut band_lower = Vec::new();
    let mut band_upper = Vec::new();
    if let Some(points) = forecast {
        for p in points {
            let x = to_x(p.ds);
            forecast_line.push((x, p.yhat));
            band_lower.push((x, p.yhat_lower));
            band_upper.push((x, p.yhat_upper));
        }
    }

    let (mut x_min, mut x_max) = (f64::INFINITY, f64::NEG_INFINITY);
    let (mut y_min, mut y_max) = (f64::INFINITY, f64::NEG_INFINITY);
    for series in [&history, &forecast_line, &band_lower, &band_upper] {
        for &(x, y) in series.iter() {
            x_min = x_min.min(x);
            x_max = x_max.max(x);
            y_min = y_min.min(y);
            y_max = y_max.max(y);
        }
    }

    if !x_min.is_finite() || !x_max.is_finite() || x_max <= x_min {
        x_min = 0.0;
        x_max = 1.0;
    }
    if !y_min.is_finite() || !y_max.is_finite() || y_max <= y_min {
        y_min = 0.0;
        y_max = 1.0;
    }

    let pad = ((y_max - y_min).abs() * 0.05).max(1e-12);

    ChartSeries {
        history,
        forecast: forecast_line,
        band_lower,
        band_upper,
        x_bounds: [x_min, x_max],
        y_bounds: [y_min - pad, y_max + pad],
    }
}

fn fmt_axis_date(v: f64) -> String {
    match NaiveDate::from_num_days_from_ce_opt(v as i32) {
        Some(d) => d.format("%Y-%m").to_string(),
        None => format!("{v:.0}"),
    }
}

fn fmt_axis_usd(v: f64) -> String {
    format!("{v:.0}")
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::domain::PriceObservation;

    fn row(y: i32, m: u32, d: u32, price: f64) -> EnrichedObservation {
        EnrichedObservation::new(PriceObservation {
            date: NaiveDate::from_ymd_opt(y, m, d).unwrap(),
            price,
        })
    }

    #[test]
    fn chart_bounds_cover_history_and_forecast() {
        let rows = vec![row(2024, 12, 30, 74.0), row(2024, 12, 31, 75.0)];
        let forecast = vec![ForecastPoint {
            ds: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
            yhat: 76.0,
            yhat_lower: 70.0,
            yhat_upper: 82.0,
        }];
        let series = chart_series(&rows, Some(&forecast));

        assert_eq!(series.history.len(), 2);
        assert_eq!(series.forecast.len(), 1);
        assert!(series.y_bounds[0] <= 70.0);
        assert!(series.y_bounds[1] >= 82.0);
        assert!(series.x_bounds[0] < series.x_bounds[1]);
    }

    #[test]
    fn empty_input_yields_safe_fallback_bounds() {
        let series = chart_series(&[], None);
        assert_eq!(series.x_bounds, [0.0, 1.0]);
        assert!(series.y_bounds[0] < series.y_bounds[1]);
    }
}
