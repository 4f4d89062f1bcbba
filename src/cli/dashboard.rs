use std::path::PathBuf;

use chrono::NaiveDate;
use crossterm::event::KeyCode;
use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Bar, BarChart, BarGroup, Block, Borders, Cell, Paragraph, Row, Table},
    Frame,
};

use crate::cli::report::describe_filters;
use crate::cli::{FilterArgs, Session};
use crate::error::Result;
use crate::fmt::{compact, money, number, period_label};
use crate::loader::{load_dataset, Dataset, DatasetCache};
use crate::models::{GroupAggregate, PeriodAggregate, Summary};
use crate::pipeline::{
    self, consistency_notes, date_bounds, distinct_values, DateRange, FilterSet, GroupKey,
    Period, PreAggregated, Selection,
};
use crate::tui::{
    money_span, run_view, View, ViewAction, BAR_STYLE, FOOTER_STYLE,
    HEADER_STYLE, NOTE_STYLE,
};

const BOLD: Style = Style::new().add_modifier(Modifier::BOLD);
const COLUMN_HEADER_STYLE: Style = Style::new()
    .fg(ratatui::style::Color::DarkGray)
    .add_modifier(Modifier::BOLD);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Panel {
    Monthly,
    Clients,
    Salespeople,
    Currencies,
    Semesters,
}

impl Panel {
    const ALL: [Panel; 5] = [
        Panel::Monthly,
        Panel::Clients,
        Panel::Salespeople,
        Panel::Currencies,
        Panel::Semesters,
    ];

    fn title(&self) -> &'static str {
        match self {
            Self::Monthly => "Sales Over Time",
            Self::Clients => "Clients",
            Self::Salespeople => "Salespeople",
            Self::Currencies => "Currencies",
            Self::Semesters => "Semesters",
        }
    }

    fn step(&self, delta: isize) -> Self {
        let idx = Self::ALL.iter().position(|p| p == self).unwrap_or(0) as isize;
        let len = Self::ALL.len() as isize;
        Self::ALL[((idx + delta).rem_euclid(len)) as usize]
    }
}

/// Next choice after the current one; wraps through "all".
fn cycle(current: &Selection, options: &[String]) -> Selection {
    let next = match current {
        Selection::All => options.first(),
        Selection::Only(v) => options
            .iter()
            .position(|o| o == v)
            .and_then(|i| options.get(i + 1)),
    };
    next.map_or(Selection::All, |v| Selection::Only(v.clone()))
}

/// Everything drawn for the current filters, recomputed on every change.
struct DashboardView {
    summary: Summary,
    periods: Vec<PeriodAggregate>,
    top_clients: Vec<GroupAggregate>,
    salespeople: Vec<GroupAggregate>,
    currencies: Vec<GroupAggregate>,
}

struct Dashboard {
    data_dir: PathBuf,
    transactions_file: String,
    cache: DatasetCache,
    data: Dataset,
    currencies: Vec<String>,
    salespeople: Vec<String>,
    filters: FilterSet,
    /// `--from`/`--to` as given; open ends are re-resolved on every reload.
    requested: (Option<NaiveDate>, Option<NaiveDate>),
    period: Period,
    compact_top: bool,
    top_clients: usize,
    top_clients_compact: usize,
    panel: Panel,
    view: DashboardView,
    status_message: Option<String>,
}

impl Dashboard {
    fn new(
        session: Session,
        cache: DatasetCache,
        filters: FilterSet,
        requested: (Option<NaiveDate>, Option<NaiveDate>),
    ) -> Self {
        let data = session.data;
        let top_clients = session.settings.top_clients.max(1);
        let view = Self::compute(&data, &filters, Period::Month, top_clients);
        Self {
            currencies: distinct_values(&data.transactions, GroupKey::Currency),
            salespeople: distinct_values(&data.transactions, GroupKey::Salesperson),
            data_dir: session.data_dir,
            transactions_file: session.settings.transactions_file,
            cache,
            data,
            filters,
            requested,
            period: Period::Month,
            compact_top: false,
            top_clients,
            top_clients_compact: session.settings.top_clients_compact.max(1),
            panel: Panel::Monthly,
            view,
            status_message: None,
        }
    }

    fn top_n(&self) -> usize {
        if self.compact_top {
            self.top_clients_compact
        } else {
            self.top_clients
        }
    }

    fn compute(data: &Dataset, filters: &FilterSet, period: Period, top_n: usize) -> DashboardView {
        let rows = pipeline::filter(&data.transactions, filters);
        DashboardView {
            summary: pipeline::summarize(&rows),
            periods: pipeline::group_by_period(&rows, period),
            top_clients: pipeline::top_n_by_value(&rows, top_n, GroupKey::Client),
            salespeople: pipeline::group_by(&rows, GroupKey::Salesperson),
            currencies: pipeline::group_by(&rows, GroupKey::Currency),
        }
    }

    fn recompute(&mut self) {
        self.view = Self::compute(&self.data, &self.filters, self.period, self.top_n());
        tracing::debug!(
            filters = %describe_filters(&self.filters),
            rows = self.view.summary.count,
            "dashboard recomputed"
        );
    }

    fn try_reload(&mut self) -> Result<()> {
        let data = load_dataset(&self.data_dir, &self.transactions_file, &mut self.cache)?;
        let (from, to) = self.requested;
        let date_range = DateRange::resolve(from, to, date_bounds(&data.transactions))?;
        self.data = data;
        self.filters.date_range = date_range;
        self.currencies = distinct_values(&self.data.transactions, GroupKey::Currency);
        self.salespeople = distinct_values(&self.data.transactions, GroupKey::Salesperson);
        if let Selection::Only(v) = &self.filters.currency {
            if !self.currencies.contains(v) {
                self.filters.currency = Selection::All;
            }
        }
        if let Selection::Only(v) = &self.filters.salesperson {
            if !self.salespeople.contains(v) {
                self.filters.salesperson = Selection::All;
            }
        }
        Ok(())
    }

    fn notes(&self) -> Vec<&'static str> {
        match self.panel {
            Panel::Salespeople if self.data.salespeople.is_some() => {
                consistency_notes(&self.filters, PreAggregated::Salespeople)
            }
            Panel::Semesters if self.data.semesters.is_some() => {
                consistency_notes(&self.filters, PreAggregated::Semesters)
            }
            _ => Vec::new(),
        }
    }

    // -----------------------------------------------------------------------
    // Drawing
    // -----------------------------------------------------------------------

    fn draw_metrics(&self, frame: &mut Frame, area: Rect) {
        let s = &self.view.summary;
        let cards = [
            ("Total Value (USD)", money(s.total_value)),
            ("Sales", number(s.count)),
            ("Mean Ticket (USD)", money(s.mean_value)),
            ("Unique Clients", number(s.unique_clients)),
        ];
        let areas = Layout::horizontal([Constraint::Ratio(1, 4); 4]).split(area);
        for ((title, value), card_area) in cards.iter().zip(areas.iter()) {
            let block = Block::default()
                .title(*title)
                .title_style(COLUMN_HEADER_STYLE)
                .borders(Borders::ALL);
            frame.render_widget(
                Paragraph::new(Span::styled(value.clone(), BOLD)).block(block),
                *card_area,
            );
        }
    }

    fn draw_monthly(&self, frame: &mut Frame, area: Rect) {
        let [chart_area, table_area] =
            Layout::horizontal([Constraint::Fill(3), Constraint::Fill(2)]).areas(area);

        let bars: Vec<Bar> = self
            .view
            .periods
            .iter()
            .map(|p| {
                Bar::default()
                    .value(p.total_value.max(0.0).round() as u64)
                    .text_value(compact(p.total_value))
                    .label(Line::from(period_label(&p.period)))
                    .style(BAR_STYLE)
            })
            .collect();
        let chart = BarChart::default()
            .block(
                Block::default()
                    .title(format!("Sales per {} (USD)", self.period.label()))
                    .title_style(BOLD)
                    .borders(Borders::NONE),
            )
            .data(BarGroup::default().bars(&bars))
            .bar_width(8)
            .bar_gap(1);
        frame.render_widget(chart, chart_area);

        let rows: Vec<Row> = self
            .view
            .periods
            .iter()
            .map(|p| {
                Row::new(vec![
                    Cell::from(period_label(&p.period)),
                    Cell::from(p.count.to_string()),
                    Cell::from(money_span(p.total_value)),
                    Cell::from(money(p.cumulative_value)),
                ])
            })
            .collect();
        let table = Table::new(
            rows,
            [
                Constraint::Length(9),
                Constraint::Length(6),
                Constraint::Fill(1),
                Constraint::Fill(1),
            ],
        )
        .header(Row::new(vec!["Period", "Sales", "Total", "Cumulative"]).style(COLUMN_HEADER_STYLE))
        .column_spacing(2);
        frame.render_widget(table, table_area);
    }

    fn group_table(rows: &[GroupAggregate], key: GroupKey, ranked: bool) -> Table<'static> {
        let body: Vec<Row> = rows
            .iter()
            .enumerate()
            .map(|(i, g)| {
                let mut cells = Vec::new();
                if ranked {
                    cells.push(Cell::from(format!("{}", i + 1)));
                }
                cells.push(Cell::from(g.key.clone()));
                cells.push(Cell::from(money_span(g.total_value)));
                cells.push(Cell::from(format!("{:.1}%", g.share_pct)));
                cells.push(Cell::from(g.count.to_string()));
                cells.push(Cell::from(money(g.mean_value)));
                Row::new(cells)
            })
            .collect();
        let mut header = Vec::new();
        let mut widths = Vec::new();
        if ranked {
            header.push("#");
            widths.push(Constraint::Length(3));
        }
        header.extend([key.label(), "Total", "Share", "Sales", "Mean"]);
        widths.extend([
            Constraint::Fill(2),
            Constraint::Fill(1),
            Constraint::Length(7),
            Constraint::Length(6),
            Constraint::Fill(1),
        ]);
        Table::new(body, widths)
            .header(Row::new(header).style(COLUMN_HEADER_STYLE))
            .column_spacing(2)
    }

    fn draw_preaggregated(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default()
            .title("Pre-aggregated (all currencies)")
            .title_style(BOLD)
            .borders(Borders::LEFT);
        match self.panel {
            Panel::Salespeople => match &self.data.salespeople {
                Some(table) => {
                    let rows: Vec<Row> = table
                        .iter()
                        .map(|s| {
                            Row::new(vec![
                                Cell::from(s.salesperson.clone()),
                                Cell::from(money(s.total_usd)),
                                Cell::from(money(s.mean_usd)),
                            ])
                        })
                        .collect();
                    let widget = Table::new(rows, [Constraint::Fill(2), Constraint::Fill(1), Constraint::Fill(1)])
                        .header(Row::new(vec!["Salesperson", "Total", "Mean Ticket"]).style(COLUMN_HEADER_STYLE))
                        .column_spacing(2)
                        .block(block);
                    frame.render_widget(widget, area);
                }
                None => frame.render_widget(
                    Paragraph::new("Salesperson summary unavailable.").style(FOOTER_STYLE).block(block),
                    area,
                ),
            },
            Panel::Currencies => match &self.data.currencies {
                Some(table) => {
                    let rows: Vec<Row> = table
                        .iter()
                        .map(|c| {
                            Row::new(vec![
                                Cell::from(c.currency.clone()),
                                Cell::from(money(c.total_usd)),
                                Cell::from(format!("{:.2}%", c.share_pct)),
                                Cell::from(c.projects.to_string()),
                            ])
                        })
                        .collect();
                    let widget = Table::new(
                        rows,
                        [
                            Constraint::Length(8),
                            Constraint::Fill(1),
                            Constraint::Length(8),
                            Constraint::Length(8),
                        ],
                    )
                    .header(Row::new(vec!["Currency", "Total", "Share", "Projects"]).style(COLUMN_HEADER_STYLE))
                    .column_spacing(2)
                    .block(block);
                    frame.render_widget(widget, area);
                }
                None => frame.render_widget(
                    Paragraph::new("Currency summary unavailable.").style(FOOTER_STYLE).block(block),
                    area,
                ),
            },
            _ => {}
        }
    }

    fn draw_semesters(&self, frame: &mut Frame, area: Rect) {
        let Some(table) = self.data.semesters.as_ref().filter(|t| !t.is_empty()) else {
            frame.render_widget(
                Paragraph::new(" Semester comparison unavailable.").style(FOOTER_STYLE),
                area,
            );
            return;
        };
        let rows: Vec<Row> = table
            .iter()
            .map(|c| {
                Row::new(vec![
                    Cell::from(c.client.clone()),
                    Cell::from(money(c.first_half_usd)),
                    Cell::from(money(c.second_half_usd)),
                    Cell::from(money_span(c.second_half_usd - c.first_half_usd)),
                ])
            })
            .collect();
        let widget = Table::new(
            rows,
            [
                Constraint::Fill(2),
                Constraint::Fill(1),
                Constraint::Fill(1),
                Constraint::Fill(1),
            ],
        )
        .header(Row::new(vec!["Client", "Jan-Jun", "Jul-Dec", "Change"]).style(COLUMN_HEADER_STYLE))
        .column_spacing(2)
        .block(
            Block::default()
                .title("Semester Comparison - Top 10 Clients (pre-aggregated)")
                .title_style(BOLD)
                .borders(Borders::NONE),
        );
        frame.render_widget(widget, area);
    }

    fn draw_content(&self, frame: &mut Frame, area: Rect) {
        if self.view.summary.count == 0 {
            frame.render_widget(
                Paragraph::new(" No sales match the current filters.").style(FOOTER_STYLE),
                area,
            );
            return;
        }
        match self.panel {
            Panel::Monthly => self.draw_monthly(frame, area),
            Panel::Clients => {
                let title = format!(" Top {} Clients by Total Value", self.top_n());
                let [title_area, table_area] =
                    Layout::vertical([Constraint::Length(1), Constraint::Fill(1)]).areas(area);
                frame.render_widget(Paragraph::new(title).style(BOLD), title_area);
                frame.render_widget(
                    Self::group_table(&self.view.top_clients, GroupKey::Client, true),
                    table_area,
                );
            }
            Panel::Salespeople | Panel::Currencies => {
                let (rows, key) = if self.panel == Panel::Salespeople {
                    (&self.view.salespeople, GroupKey::Salesperson)
                } else {
                    (&self.view.currencies, GroupKey::Currency)
                };
                let [left, right] =
                    Layout::horizontal([Constraint::Fill(3), Constraint::Fill(2)]).areas(area);
                frame.render_widget(Self::group_table(rows, key, false), left);
                self.draw_preaggregated(frame, right);
            }
            Panel::Semesters => self.draw_semesters(frame, area),
        }
    }
}

impl View for Dashboard {
    fn draw(&mut self, frame: &mut Frame) {
        let area = frame.area();
        let [header_area, filter_area, sep_area, metrics_area, content_area, note_area, footer_area] =
            Layout::vertical([
                Constraint::Length(1),
                Constraint::Length(1),
                Constraint::Length(1),
                Constraint::Length(3),
                Constraint::Fill(1),
                Constraint::Length(1),
                Constraint::Length(1),
            ])
            .areas(area);

        let tabs: Vec<Span> = Panel::ALL
            .iter()
            .flat_map(|p| {
                let style = if *p == self.panel { HEADER_STYLE } else { FOOTER_STYLE };
                [Span::styled(format!(" {} ", p.title()), style), Span::raw(" ")]
            })
            .collect();
        let mut header = vec![Span::styled(" Sales Dashboard  ", HEADER_STYLE)];
        header.extend(tabs);
        frame.render_widget(Paragraph::new(Line::from(header)), header_area);

        frame.render_widget(
            Paragraph::new(format!(" {}", describe_filters(&self.filters))),
            filter_area,
        );
        frame.render_widget(
            Paragraph::new("━".repeat(area.width as usize)).style(FOOTER_STYLE),
            sep_area,
        );

        self.draw_metrics(frame, metrics_area);
        self.draw_content(frame, content_area);

        let note = self
            .status_message
            .clone()
            .or_else(|| self.notes().first().map(|n| n.to_string()))
            .unwrap_or_default();
        frame.render_widget(Paragraph::new(format!(" {note}")).style(NOTE_STYLE), note_area);

        frame.render_widget(
            Paragraph::new(
                " Tab panel  c currency  s salesperson  t top 10/15  p period  r/R reload  q quit",
            )
            .style(FOOTER_STYLE),
            footer_area,
        );
    }

    fn handle_key(&mut self, code: KeyCode) -> ViewAction {
        self.status_message = None;
        match code {
            KeyCode::Char('q') | KeyCode::Esc => return ViewAction::Close,
            KeyCode::Char('r') => return ViewAction::Reload,
            KeyCode::Char('R') => {
                self.cache.clear();
                return ViewAction::Reload;
            }
            KeyCode::Tab | KeyCode::Right => self.panel = self.panel.step(1),
            KeyCode::BackTab | KeyCode::Left => self.panel = self.panel.step(-1),
            KeyCode::Char('c') => {
                self.filters.currency = cycle(&self.filters.currency, &self.currencies);
            }
            KeyCode::Char('s') => {
                self.filters.salesperson = cycle(&self.filters.salesperson, &self.salespeople);
            }
            KeyCode::Char('t') => self.compact_top = !self.compact_top,
            KeyCode::Char('p') => self.period = self.period.next(),
            _ => return ViewAction::Continue,
        }
        self.recompute();
        ViewAction::Continue
    }

    fn reload(&mut self) {
        match self.try_reload() {
            Ok(()) => {
                self.status_message = Some(format!(
                    "Reloaded {} sales from {}",
                    number(self.data.transactions.len()),
                    self.data_dir.display()
                ));
            }
            Err(e) => {
                tracing::warn!(error = %e, "dashboard reload failed");
                self.status_message = Some(format!("Reload failed: {e}"));
            }
        }
        self.recompute();
    }
}

pub fn run(data_dir: Option<&str>, args: &FilterArgs) -> Result<()> {
    let mut cache = DatasetCache::new();
    let session = Session::open(data_dir, &mut cache)?;
    let requested = args.requested_dates()?;
    let filters = args.build(&session.data.transactions)?;
    let mut dashboard = Dashboard::new(session, cache, filters, requested);
    run_view(&mut dashboard)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::tests::write_fixture;
    use crate::pipeline::tests::d;
    use crate::loader::TRANSACTIONS_FILE;
    use crate::settings::Settings;

    fn dashboard(dir: &std::path::Path) -> Dashboard {
        write_fixture(dir);
        let mut cache = DatasetCache::new();
        let data = load_dataset(dir, TRANSACTIONS_FILE, &mut cache).unwrap();
        let session = Session {
            settings: Settings::default(),
            data_dir: dir.to_path_buf(),
            data,
        };
        Dashboard::new(session, cache, FilterSet::new(), (None, None))
    }

    fn dashboard_with(dir: &std::path::Path, args: &FilterArgs) -> Dashboard {
        write_fixture(dir);
        let mut cache = DatasetCache::new();
        let data = load_dataset(dir, TRANSACTIONS_FILE, &mut cache).unwrap();
        let filters = args.build(&data.transactions).unwrap();
        let session = Session {
            settings: Settings::default(),
            data_dir: dir.to_path_buf(),
            data,
        };
        Dashboard::new(session, cache, filters, args.requested_dates().unwrap())
    }

    #[test]
    fn test_cycle_wraps_through_all() {
        let options = vec!["EUR".to_string(), "USD".to_string()];
        let first = cycle(&Selection::All, &options);
        assert_eq!(first, Selection::Only("EUR".into()));
        let second = cycle(&first, &options);
        assert_eq!(second, Selection::Only("USD".into()));
        assert_eq!(cycle(&second, &options), Selection::All);
        assert_eq!(cycle(&Selection::All, &[]), Selection::All);
    }

    #[test]
    fn test_initial_view() {
        let dir = tempfile::tempdir().unwrap();
        let dash = dashboard(dir.path());
        assert_eq!(dash.view.summary.count, 3);
        assert_eq!(dash.view.summary.total_value, 350.0);
        assert_eq!(dash.view.periods.len(), 2);
        assert_eq!(dash.currencies, vec!["EUR", "USD"]);
    }

    #[test]
    fn test_currency_key_refilters() {
        let dir = tempfile::tempdir().unwrap();
        let mut dash = dashboard(dir.path());
        dash.handle_key(KeyCode::Char('c'));
        assert_eq!(dash.filters.currency, Selection::Only("EUR".into()));
        assert_eq!(dash.view.summary.total_value, 50.0);
        assert_eq!(dash.view.summary.count, 1);
    }

    #[test]
    fn test_salesperson_key_and_notes() {
        let dir = tempfile::tempdir().unwrap();
        let mut dash = dashboard(dir.path());
        dash.handle_key(KeyCode::Char('s'));
        assert_eq!(dash.filters.salesperson, Selection::Only("Ana".into()));
        assert_eq!(dash.view.summary.total_value, 150.0);

        dash.handle_key(KeyCode::Char('c'));
        dash.panel = Panel::Salespeople;
        assert_eq!(dash.notes().len(), 1);
    }

    #[test]
    fn test_top_toggle_and_period_cycle() {
        let dir = tempfile::tempdir().unwrap();
        let mut dash = dashboard(dir.path());
        assert_eq!(dash.top_n(), 15);
        dash.handle_key(KeyCode::Char('t'));
        assert_eq!(dash.top_n(), 10);
        dash.handle_key(KeyCode::Char('p'));
        assert_eq!(dash.period, Period::Semester);
        assert_eq!(dash.view.periods.len(), 1);
        assert_eq!(dash.view.periods[0].period, "2024-S1");
    }

    #[test]
    fn test_panel_navigation() {
        let dir = tempfile::tempdir().unwrap();
        let mut dash = dashboard(dir.path());
        dash.handle_key(KeyCode::Tab);
        assert_eq!(dash.panel, Panel::Clients);
        dash.handle_key(KeyCode::BackTab);
        dash.handle_key(KeyCode::BackTab);
        assert_eq!(dash.panel, Panel::Semesters);
        dash.handle_key(KeyCode::Left);
        assert_eq!(dash.panel, Panel::Currencies);
    }

    #[test]
    fn test_quit_and_reload_actions() {
        let dir = tempfile::tempdir().unwrap();
        let mut dash = dashboard(dir.path());
        assert!(matches!(dash.handle_key(KeyCode::Char('q')), ViewAction::Close));
        assert!(matches!(dash.handle_key(KeyCode::Char('r')), ViewAction::Reload));
    }

    #[test]
    fn test_reload_picks_up_new_rows_and_drops_stale_filter() {
        let dir = tempfile::tempdir().unwrap();
        let mut dash = dashboard(dir.path());
        dash.handle_key(KeyCode::Char('c'));
        assert_eq!(dash.filters.currency, Selection::Only("EUR".into()));

        std::fs::write(
            dir.path().join(TRANSACTIONS_FILE),
            "Data,Cliente,Vendedor,Moeda,Valor_USD\n\
2024-03-01,Initech,Carla,BRL,10.0\n\
2024-03-02,Initech,Carla,BRL,20.0\n\
2024-03-03,Acme,Ana,USD,30.0\n\
2024-03-04,Acme,Ana,USD,40.0\n",
        )
        .unwrap();
        dash.reload();
        assert!(dash.status_message.as_deref().unwrap().starts_with("Reloaded 4 sales"));
        assert!(dash.filters.currency.is_all());
        assert_eq!(dash.view.summary.total_value, 100.0);
        assert_eq!(dash.currencies, vec!["BRL", "USD"]);
    }

    #[test]
    fn test_forced_reload_rereads_unchanged_files() {
        let dir = tempfile::tempdir().unwrap();
        let mut dash = dashboard(dir.path());
        let before = std::sync::Arc::clone(&dash.data.transactions);

        dash.reload();
        assert!(std::sync::Arc::ptr_eq(&before, &dash.data.transactions));

        assert!(matches!(dash.handle_key(KeyCode::Char('R')), ViewAction::Reload));
        dash.reload();
        assert!(!std::sync::Arc::ptr_eq(&before, &dash.data.transactions));
        assert_eq!(dash.view.summary.count, 3);
    }

    #[test]
    fn test_reload_extends_open_ended_date_range() {
        let dir = tempfile::tempdir().unwrap();
        let args = FilterArgs {
            from_date: Some("2024-01-01".into()),
            ..FilterArgs::default()
        };
        let mut dash = dashboard_with(dir.path(), &args);
        assert_eq!(dash.filters.date_range.unwrap().end, d(2024, 2, 10));

        std::fs::write(
            dir.path().join(TRANSACTIONS_FILE),
            "Data,Cliente,Vendedor,Moeda,Valor_USD\n\
2024-01-05,Acme,Ana,USD,100.0\n\
2024-06-01,Initech,Carla,USD,999.0\n",
        )
        .unwrap();
        dash.reload();
        let range = dash.filters.date_range.unwrap();
        assert_eq!(range.start, d(2024, 1, 1));
        assert_eq!(range.end, d(2024, 6, 1));
        assert_eq!(dash.view.summary.total_value, 1099.0);
    }

    #[test]
    fn test_reload_keeps_explicit_date_ends() {
        let dir = tempfile::tempdir().unwrap();
        let args = FilterArgs {
            from_date: Some("2024-01-01".into()),
            to_date: Some("2024-01-31".into()),
            ..FilterArgs::default()
        };
        let mut dash = dashboard_with(dir.path(), &args);
        assert_eq!(dash.view.summary.total_value, 150.0);

        std::fs::write(
            dir.path().join(TRANSACTIONS_FILE),
            "Data,Cliente,Vendedor,Moeda,Valor_USD\n\
2024-01-05,Acme,Ana,USD,100.0\n\
2024-06-01,Initech,Carla,USD,999.0\n",
        )
        .unwrap();
        dash.reload();
        assert_eq!(dash.filters.date_range.unwrap().end, d(2024, 1, 31));
        assert_eq!(dash.view.summary.total_value, 100.0);
    }

    #[test]
    fn test_semester_panel_notes_follow_filters() {
        let dir = tempfile::tempdir().unwrap();
        let mut dash = dashboard(dir.path());
        dash.handle_key(KeyCode::BackTab);
        assert_eq!(dash.panel, Panel::Semesters);
        assert!(dash.notes().is_empty());

        dash.handle_key(KeyCode::Char('c'));
        assert_eq!(dash.notes().len(), 1);
        dash.handle_key(KeyCode::Char('s'));
        assert_eq!(dash.notes().len(), 2);
    }

    #[test]
    fn test_semester_panel_without_table_has_no_notes() {
        let dir = tempfile::tempdir().unwrap();
        let mut dash = dashboard(dir.path());
        std::fs::remove_file(dir.path().join(crate::loader::SEMESTERS_FILE)).unwrap();
        dash.reload();
        assert!(dash.data.semesters.is_none());
        dash.panel = Panel::Semesters;
        dash.handle_key(KeyCode::Char('c'));
        assert!(dash.notes().is_empty());
    }

    #[test]
    fn test_zero_top_setting_still_ranks() {
        let dir = tempfile::tempdir().unwrap();
        write_fixture(dir.path());
        let mut cache = DatasetCache::new();
        let data = load_dataset(dir.path(), TRANSACTIONS_FILE, &mut cache).unwrap();
        let session = Session {
            settings: Settings {
                top_clients: 0,
                ..Settings::default()
            },
            data_dir: dir.path().to_path_buf(),
            data,
        };
        let dash = Dashboard::new(session, cache, FilterSet::new(), (None, None));
        assert_eq!(dash.top_n(), 1);
        assert_eq!(dash.view.top_clients.len(), 1);
    }

    #[test]
    fn test_reload_failure_keeps_previous_data() {
        let dir = tempfile::tempdir().unwrap();
        let mut dash = dashboard(dir.path());
        std::fs::remove_file(dir.path().join(TRANSACTIONS_FILE)).unwrap();
        dash.reload();
        assert!(dash.status_message.as_deref().unwrap().starts_with("Reload failed"));
        assert_eq!(dash.view.summary.count, 3);
    }
}
