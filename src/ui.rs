use anyhow::Result;
use crossterm::{
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind, MouseEventKind,
    },
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    symbols,
    text::{Line, Span},
    widgets::{Axis, Block, Borders, Chart, Dataset, GraphType, Paragraph},
    Frame, Terminal,
};
use std::io;
use std::sync::Arc;
use tracing::debug;

use stock_chart::{
    ChartModel, ChartSink, Company, LineChart, Selection, Series, StockChart, TimeSeriesRecord,
};

pub struct App {
    pub chart: StockChart<ChartSink>,
    /// Index of the hovered record, shared by its Open and Close markers
    pub hover: Option<usize>,
    chart_area: Option<Rect>,
}

impl App {
    /// Build the component and draw it for the first time
    pub fn new(dataset: Arc<Vec<TimeSeriesRecord>>, selection: Selection) -> Self {
        let mut chart = StockChart::new(dataset, selection, ChartSink::new());
        chart.mount();
        Self {
            chart,
            hover: None,
            chart_area: None,
        }
    }

    pub fn model(&self) -> Option<&ChartModel> {
        self.chart.sink().model()
    }

    pub fn line_chart(&self) -> Option<&LineChart> {
        self.model().and_then(ChartModel::as_lines)
    }

    /// Apply a key press. Returns false when the app should quit.
    pub fn handle_key(&mut self, code: KeyCode) -> bool {
        let redrawn = match code {
            KeyCode::Char('q') | KeyCode::Esc => return false,
            KeyCode::Right => self.chart.select_next_company(),
            KeyCode::Left => self.chart.select_previous_company(),
            KeyCode::Down | KeyCode::Char('j') => self.chart.select_next_month(),
            KeyCode::Up | KeyCode::Char('k') => self.chart.select_previous_month(),
            KeyCode::Char(c @ '1'..='5') => {
                let index = c as usize - '1' as usize;
                self.chart.set_company(Company::ALL[index])
            }
            KeyCode::Char('l') | KeyCode::Char(']') => {
                self.hover_next();
                false
            }
            KeyCode::Char('h') | KeyCode::Char('[') => {
                self.hover_previous();
                false
            }
            _ => false,
        };

        // Old hover indices point into the previous record set
        if redrawn {
            self.hover = None;
        }
        true
    }

    pub fn hover_next(&mut self) {
        let len = self.line_chart().map_or(0, LineChart::len);
        if len == 0 {
            return;
        }
        self.hover = Some(match self.hover {
            Some(i) if i + 1 < len => i + 1,
            _ => 0,
        });
    }

    pub fn hover_previous(&mut self) {
        let len = self.line_chart().map_or(0, LineChart::len);
        if len == 0 {
            return;
        }
        self.hover = Some(match self.hover {
            Some(0) | None => len - 1,
            Some(i) => i - 1,
        });
    }

    /// Snap the hover to the record nearest the mouse column; leaving the
    /// plot clears it.
    pub fn hover_at(&mut self, column: u16, row: u16) {
        let Some(area) = self.chart_area else {
            return;
        };
        let index = self.line_chart().and_then(|chart| {
            let left = area.x + 1 + plot_left_offset(chart, area.width.saturating_sub(2));
            let right = (area.x + area.width).saturating_sub(1);
            let top = area.y + 1;
            let bottom = (area.y + area.height).saturating_sub(1);
            if column < left || column >= right || row < top || row >= bottom {
                return None;
            }
            let fraction = f64::from(column - left) / f64::from((right - left).max(1));
            let x = chart.x_bounds.min + fraction * chart.x_bounds.span();
            chart.nearest_index(x)
        });
        if index != self.hover {
            debug!(hover = ?index, "hover moved");
        }
        self.hover = index;
    }
}

/// Columns ratatui reserves left of the plot inside the chart border: the
/// wider of the y labels and the overhang of the left-aligned first x label,
/// capped at a third of the width, plus one for the y axis line.
fn plot_left_offset(chart: &LineChart, inner_width: u16) -> u16 {
    let y_width = chart.y_labels.iter().map(String::len).max().unwrap_or(0);
    let x_overhang = chart
        .x_labels
        .first()
        .map_or(0, |label| label.len().saturating_sub(1));
    let label_width = y_width.max(x_overhang) as u16;
    label_width.min(inner_width / 3) + 1
}

pub fn run_ui(app: &mut App) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Run the app
    let res = run_app(&mut terminal, app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen, DisableMouseCapture)?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        tracing::error!(error = %err, "ui loop failed");
        println!("Error: {:?}", err);
    }

    Ok(())
}

fn run_app<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
) -> io::Result<()> {
    loop {
        terminal.draw(|f| ui(f, app))?;

        match event::read()? {
            Event::Key(key) if key.kind == KeyEventKind::Press => {
                if !app.handle_key(key.code) {
                    return Ok(());
                }
            }
            Event::Mouse(mouse) if mouse.kind == MouseEventKind::Moved => {
                app.hover_at(mouse.column, mouse.row);
            }
            _ => {}
        }
    }
}

fn ui(f: &mut Frame, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Company + month controls
            Constraint::Min(0),    // Chart and side panel
            Constraint::Length(3), // Status bar
        ])
        .split(f.size());

    render_controls(f, chunks[0], app);

    let content_chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(0), Constraint::Length(30)])
        .split(chunks[1]);

    app.chart_area = Some(content_chunks[0]);
    render_chart(f, content_chunks[0], app);

    let side_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(4), Constraint::Min(0)])
        .split(content_chunks[1]);

    render_legend(f, side_chunks[0]);
    render_tooltip(f, side_chunks[1], app);

    render_status_bar(f, chunks[2], app);
}

fn series_color(series: Series) -> Color {
    let (r, g, b) = series.rgb();
    Color::Rgb(r, g, b)
}

fn render_controls(f: &mut Frame, area: Rect, app: &App) {
    let selection = app.chart.selection();

    let mut spans = vec![Span::styled(
        "Company: ",
        Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
    )];
    for (i, company) in Company::ALL.iter().enumerate() {
        let checked = *company == selection.company;
        let style = if checked {
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::DarkGray)
        };
        let marker = if checked { "(•)" } else { "( )" };
        spans.push(Span::styled(format!("{} {} {}  ", i + 1, marker, company), style));
    }

    spans.push(Span::raw("│  "));
    spans.push(Span::styled(
        "Month: ",
        Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
    ));
    spans.push(Span::styled(
        format!("◀ {} ▶", selection.month),
        Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
    ));

    let header = Paragraph::new(vec![Line::from(spans)]).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan)),
    );

    f.render_widget(header, area);
}

fn render_chart(f: &mut Frame, area: Rect, app: &App) {
    let selection = app.chart.selection();
    let title = format!(" {} · {} ", selection.company, selection.month);
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::White))
        .title(title);

    let Some(chart) = app.line_chart() else {
        let placeholder = Paragraph::new(vec![
            Line::from(""),
            Line::from(Span::styled(
                format!("  No {} records for {}", selection.company, selection.month),
                Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
            )),
        ])
        .block(block);
        f.render_widget(placeholder, area);
        return;
    };

    let hovered: Vec<(f64, f64)> = app
        .hover
        .and_then(|i| chart.open.get(i).zip(chart.close.get(i)))
        .map(|(open, close)| vec![*open, *close])
        .unwrap_or_default();

    let mut datasets = Vec::new();
    for series in Series::ALL {
        datasets.push(
            Dataset::default()
                .name(series.label())
                .marker(symbols::Marker::Braille)
                .graph_type(GraphType::Line)
                .style(Style::default().fg(series_color(series)))
                .data(chart.series(series)),
        );
    }
    // Point markers, unnamed so the legend keeps two entries
    for series in Series::ALL {
        datasets.push(
            Dataset::default()
                .marker(symbols::Marker::Dot)
                .graph_type(GraphType::Scatter)
                .style(Style::default().fg(series_color(series)))
                .data(chart.series(series)),
        );
    }
    datasets.push(
        Dataset::default()
            .marker(symbols::Marker::Block)
            .graph_type(GraphType::Scatter)
            .style(Style::default().fg(Color::Yellow))
            .data(&hovered),
    );

    let widget = Chart::new(datasets)
        .block(block)
        .x_axis(
            Axis::default()
                .title("Date")
                .style(Style::default().fg(Color::Gray))
                .bounds([chart.x_bounds.min, chart.x_bounds.max])
                .labels(chart.x_labels.iter().map(|l| Span::raw(l.as_str())).collect()),
        )
        .y_axis(
            Axis::default()
                .title("Price")
                .style(Style::default().fg(Color::Gray))
                .bounds([chart.y_bounds.min, chart.y_bounds.max])
                .labels(chart.y_labels.iter().map(|l| Span::raw(l.as_str())).collect()),
        )
        .hidden_legend_constraints((Constraint::Ratio(1, 1), Constraint::Ratio(1, 1)));

    f.render_widget(widget, area);
}

fn render_legend(f: &mut Frame, area: Rect) {
    let lines: Vec<Line> = Series::ALL
        .iter()
        .map(|series| {
            Line::from(vec![
                Span::raw(" "),
                Span::styled("■■", Style::default().fg(series_color(*series))),
                Span::raw(" "),
                Span::raw(series.label()),
            ])
        })
        .collect();

    let legend = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::White))
            .title(" Legend "),
    );

    f.render_widget(legend, area);
}

fn render_tooltip(f: &mut Frame, area: Rect, app: &App) {
    let tooltip = app
        .hover
        .and_then(|i| app.line_chart().and_then(|chart| chart.tooltip(i)));

    let content = match tooltip {
        Some(tooltip) => {
            let mut lines = vec![Line::from("")];
            for text in tooltip.lines() {
                let (label, value) = text.split_once(": ").unwrap_or((text, ""));
                lines.push(Line::from(vec![
                    Span::styled(
                        format!(" {}: ", label),
                        Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
                    ),
                    Span::raw(value.to_string()),
                ]));
            }
            lines
        }
        None => vec![
            Line::from(""),
            Line::from(Span::styled(
                " Hover a point or press h/l",
                Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
            )),
        ],
    };

    let panel = Paragraph::new(content).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Yellow))
            .title(" Point "),
    );

    f.render_widget(panel, area);
}

fn render_status_bar(f: &mut Frame, area: Rect, app: &App) {
    let shown = app.line_chart().map_or(0, LineChart::len);

    let status_spans = vec![
        Span::styled(
            format!(" Days: {}/{} ", shown, app.chart.dataset().len()),
            Style::default().fg(Color::Cyan),
        ),
        Span::raw(" | "),
        Span::styled("←/→", Style::default().fg(Color::Yellow)),
        Span::raw(" Company | "),
        Span::styled("↑/↓", Style::default().fg(Color::Yellow)),
        Span::raw(" Month | "),
        Span::styled("h/l", Style::default().fg(Color::Yellow)),
        Span::raw(" Point | "),
        Span::styled("q", Style::default().fg(Color::Red)),
        Span::raw(" Quit"),
    ];

    let status_bar = Paragraph::new(vec![Line::from(status_spans)]).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::White)),
    );

    f.render_widget(status_bar, area);
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use ratatui::backend::TestBackend;
    use stock_chart::Month;

    fn dataset() -> Arc<Vec<TimeSeriesRecord>> {
        let rec = |company, m, d, open, close| {
            let date = NaiveDate::from_ymd_opt(2023, m, d).unwrap();
            TimeSeriesRecord::new(company, date, open, close).unwrap()
        };
        Arc::new(vec![
            rec(Company::Apple, 11, 1, 170.5, 173.97),
            rec(Company::Apple, 11, 2, 175.5, 177.57),
            rec(Company::Apple, 11, 3, 174.2, 176.65),
            rec(Company::Meta, 11, 1, 310.0, 312.5),
        ])
    }

    fn screen(app: &mut App) -> String {
        let mut terminal = Terminal::new(TestBackend::new(120, 30)).unwrap();
        terminal.draw(|f| ui(f, app)).unwrap();
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|cell| cell.symbol())
            .collect()
    }

    #[test]
    fn test_new_app_is_mounted() {
        let app = App::new(dataset(), Selection::default());
        assert_eq!(app.chart.sink().renders(), 1);
        assert_eq!(app.line_chart().map(LineChart::len), Some(3));
    }

    #[test]
    fn test_keys_change_selection() {
        let mut app = App::new(dataset(), Selection::default());

        assert!(app.handle_key(KeyCode::Right));
        assert_eq!(app.chart.selection().company, Company::Microsoft);
        assert!(app.handle_key(KeyCode::Char('5')));
        assert_eq!(app.chart.selection().company, Company::Meta);
        assert!(app.handle_key(KeyCode::Down));
        assert_eq!(app.chart.selection().month, Month::December);
        assert!(!app.handle_key(KeyCode::Char('q')));

        // Pressing the already selected company does not redraw
        let renders = app.chart.sink().renders();
        app.handle_key(KeyCode::Char('5'));
        assert_eq!(app.chart.sink().renders(), renders);
    }

    #[test]
    fn test_hover_cycles_and_resets() {
        let mut app = App::new(dataset(), Selection::default());

        app.handle_key(KeyCode::Char('h'));
        assert_eq!(app.hover, Some(2));
        app.handle_key(KeyCode::Char('l'));
        assert_eq!(app.hover, Some(0));

        app.handle_key(KeyCode::Up);
        assert_eq!(app.hover, None);

        // October has no data, so there is nothing to hover
        app.handle_key(KeyCode::Char('l'));
        assert_eq!(app.hover, None);
    }

    #[test]
    fn test_draws_chart_legend_and_tooltip() {
        let mut app = App::new(dataset(), Selection::default());
        app.hover_next();
        let text = screen(&mut app);

        assert!(text.contains("(•) Apple"));
        assert!(text.contains("November"));
        assert!(text.contains("Legend"));
        assert!(text.contains("Open"));
        assert!(text.contains("Close"));
        assert!(text.contains("Wed Nov 01 2023"));
        assert!(text.contains("$3.47"));
    }

    #[test]
    fn test_draws_placeholder_for_empty_selection() {
        let mut app = App::new(dataset(), Selection::new(Company::Google, Month::January));
        assert!(app.model().is_some_and(ChartModel::is_empty));

        let text = screen(&mut app);
        assert!(text.contains("No Google records for January"));
    }

    #[test]
    fn test_mouse_hover_maps_to_nearest_day() {
        let mut app = App::new(dataset(), Selection::default());
        screen(&mut app);
        let area = app.chart_area.unwrap();

        // Far right of the plot is the last day
        app.hover_at(area.x + area.width - 2, area.y + 2);
        assert_eq!(app.hover, Some(2));

        // Borders are outside the plot
        app.hover_at(area.x, area.y);
        assert_eq!(app.hover, None);
    }

    #[test]
    fn test_mouse_hover_respects_first_x_label_overhang() {
        let date = |d| NaiveDate::from_ymd_opt(2023, 11, d).unwrap();
        let dataset = Arc::new(vec![
            TimeSeriesRecord::new(Company::Apple, date(1), 10.0, 18.0).unwrap(),
            TimeSeriesRecord::new(Company::Apple, date(30), 12.0, 14.0).unwrap(),
        ]);
        let mut app = App::new(dataset, Selection::default());
        let chart = app.line_chart().unwrap();
        assert_eq!(chart.y_labels.first().map(String::as_str), Some("10"));
        assert_eq!(chart.x_labels.first().map(String::as_str), Some("Nov 01"));

        let mut terminal = Terminal::new(TestBackend::new(120, 30)).unwrap();
        terminal.draw(|f| ui(f, &mut app)).unwrap();
        let area = app.chart_area.unwrap();

        // "Nov 01" overhangs the y axis by 5 columns, wider than "10"
        let axis_column = area.x + 1 + 5;
        let row = area.y + 2;
        assert_eq!(terminal.backend().buffer().get(axis_column, row).symbol(), "│");

        app.hover_at(axis_column, row);
        assert_eq!(app.hover, None);
        app.hover_at(axis_column + 1, row);
        assert_eq!(app.hover, Some(0));
    }
}
