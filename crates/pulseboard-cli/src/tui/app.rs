use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use pulseboard_core::{
    export, mock::MockProvider, Account, DashboardSnapshot, FilterState, RangePreset,
    RangeSelection,
};

use super::data::DataLoader;
use super::settings::Settings;
use super::themes::{Theme, ThemeName};

const STATUS_EXPIRY: Duration = Duration::from_secs(3);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
    Overview,
    Series,
    Accounts,
    Sources,
}

impl Tab {
    pub fn all() -> [Tab; 4] {
        [Tab::Overview, Tab::Series, Tab::Accounts, Tab::Sources]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Tab::Overview => "Overview",
            Tab::Series => "Series",
            Tab::Accounts => "Accounts",
            Tab::Sources => "Sources",
        }
    }

    pub fn index(&self) -> usize {
        Self::all().iter().position(|t| t == self).unwrap_or(0)
    }

    pub fn next(&self) -> Tab {
        let all = Self::all();
        all[(self.index() + 1) % all.len()]
    }

    pub fn prev(&self) -> Tab {
        let all = Self::all();
        all[(self.index() + all.len() - 1) % all.len()]
    }
}

pub struct TuiConfig {
    pub theme: String,
    /// Explicit filter from CLI flags; `None` restores the persisted one.
    pub filter: Option<FilterState>,
    /// Settings file override; `None` uses the user config directory.
    pub settings_path: Option<PathBuf>,
}

pub struct App {
    pub should_quit: bool,
    pub current_tab: Tab,
    pub theme: Theme,
    pub roster: Vec<Account>,
    pub filter: FilterState,
    pub snapshot: Option<DashboardSnapshot>,
    pub loading: bool,
    pub error: Option<String>,
    pub selected_row: usize,
    pub status_message: Option<String>,
    pub terminal_width: u16,
    pub terminal_height: u16,
    status_set_at: Option<Instant>,
    settings: Settings,
    settings_path: Option<PathBuf>,
    loader: DataLoader,
}

impl App {
    pub fn new(config: TuiConfig) -> Result<Self> {
        let settings_path = config.settings_path.or_else(Settings::config_path);
        let mut settings = settings_path
            .as_deref()
            .map(Settings::load_from)
            .unwrap_or_default();
        let theme_name = ThemeName::parse(&config.theme).unwrap_or_else(|| settings.theme_name());
        settings.set_theme(theme_name);

        let roster = MockProvider::demo_roster();
        let filter = config.filter.unwrap_or_else(|| {
            let selected_accounts = if settings.enabled_accounts.is_empty() {
                roster.iter().map(|a| a.id.clone()).collect()
            } else {
                settings.enabled_accounts.clone()
            };
            FilterState {
                selected_accounts,
                range: RangeSelection::preset(settings.preset_days),
                compare: settings.compare,
            }
        });

        Ok(Self {
            should_quit: false,
            current_tab: Tab::Overview,
            theme: Theme::from_name(theme_name),
            roster,
            filter,
            snapshot: None,
            loading: false,
            error: None,
            selected_row: 0,
            status_message: None,
            terminal_width: 0,
            terminal_height: 0,
            status_set_at: None,
            settings,
            settings_path,
            loader: DataLoader::new()?,
        })
    }

    pub fn reload(&mut self) {
        self.loading = true;
        match self.loader.load(&self.roster, &self.filter) {
            Ok(Some(snapshot)) => {
                self.error = None;
                match &snapshot.warning {
                    Some(warning) => self.set_status(warning.clone()),
                    None => self.set_status("Data refreshed".to_string()),
                }
                self.snapshot = Some(snapshot);
                self.clamp_selection();
            }
            // Stale generation, a newer refresh owns the screen.
            Ok(None) => {}
            Err(err) => {
                tracing::warn!(%err, "refresh failed");
                self.error = Some(err.to_string());
            }
        }
        self.loading = false;
    }

    pub fn handle_key_event(&mut self, key: KeyEvent) {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            self.should_quit = true;
            return;
        }
        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => self.should_quit = true,
            KeyCode::Tab | KeyCode::Right => {
                self.current_tab = self.current_tab.next();
                self.selected_row = 0;
            }
            KeyCode::BackTab | KeyCode::Left => {
                self.current_tab = self.current_tab.prev();
                self.selected_row = 0;
            }
            KeyCode::Up => self.selected_row = self.selected_row.saturating_sub(1),
            KeyCode::Down => {
                if self.selected_row + 1 < self.row_count() {
                    self.selected_row += 1;
                }
            }
            KeyCode::Char(c @ '1'..='9') => {
                let idx = c as usize - '1' as usize;
                self.toggle_account(idx);
            }
            KeyCode::Char('d') => self.cycle_preset(),
            KeyCode::Char('c') => self.toggle_compare(),
            KeyCode::Char('r') => self.reload(),
            KeyCode::Char('e') => self.export_csv(),
            KeyCode::Char('p') => self.cycle_theme(),
            _ => {}
        }
    }

    pub fn on_tick(&mut self) {
        if let Some(set_at) = self.status_set_at {
            if set_at.elapsed() >= STATUS_EXPIRY {
                self.status_message = None;
                self.status_set_at = None;
            }
        }
    }

    pub fn set_terminal_size(&mut self, width: u16, height: u16) {
        self.terminal_width = width;
        self.terminal_height = height;
    }

    pub fn set_status(&mut self, message: String) {
        self.status_message = Some(message);
        self.status_set_at = Some(Instant::now());
    }

    pub fn account_selected(&self, id: &str) -> bool {
        self.filter.selected_accounts.iter().any(|a| a == id)
    }

    fn toggle_account(&mut self, index: usize) {
        let Some(account) = self.roster.get(index) else {
            return;
        };
        let id = account.id.clone();
        if let Some(pos) = self.filter.selected_accounts.iter().position(|a| *a == id) {
            self.filter.selected_accounts.remove(pos);
        } else {
            self.filter.selected_accounts.push(id);
        }
        self.persist_filter();
        self.reload();
    }

    fn cycle_preset(&mut self) {
        let presets = RangePreset::defaults();
        let current = match &self.filter.range.manual {
            Some(_) => None,
            None => presets
                .iter()
                .position(|p| p.days == self.filter.range.preset.days),
        };
        let next = match current {
            Some(idx) => &presets[(idx + 1) % presets.len()],
            // Manual range or a custom day count goes back to the first preset.
            None => &presets[0],
        };
        self.filter.range = RangeSelection::preset(next.days);
        self.persist_filter();
        self.reload();
    }

    fn toggle_compare(&mut self) {
        self.filter.compare = !self.filter.compare;
        self.persist_filter();
        self.reload();
    }

    fn cycle_theme(&mut self) {
        let next = self.theme.name.next();
        self.theme = Theme::from_name(next);
        self.settings.set_theme(next);
        self.persist_settings();
        self.set_status(format!("Theme: {}", next.as_str()));
    }

    fn export_csv(&mut self) {
        let Some(snapshot) = &self.snapshot else {
            self.set_status("Nothing to export yet".to_string());
            return;
        };
        let path = PathBuf::from(export::EXPORT_FILENAME);
        match export::write_csv(&path, &snapshot.days) {
            Ok(()) => self.set_status(format!(
                "Exported {} days to {}",
                snapshot.days.len(),
                path.display()
            )),
            Err(err) => self.set_status(format!("Export failed: {err}")),
        }
    }

    fn persist_filter(&mut self) {
        self.settings.compare = self.filter.compare;
        if self.filter.range.manual.is_none() {
            self.settings.preset_days = self.filter.range.preset.days;
        }
        self.settings.enabled_accounts = self.filter.selected_accounts.clone();
        self.persist_settings();
    }

    fn persist_settings(&mut self) {
        let Some(path) = self.settings_path.clone() else {
            return;
        };
        if let Err(err) = self.settings.save_to(&path) {
            self.set_status(format!("Could not save settings: {err}"));
        }
    }

    fn clamp_selection(&mut self) {
        let count = self.row_count();
        if count == 0 {
            self.selected_row = 0;
        } else if self.selected_row >= count {
            self.selected_row = count - 1;
        }
    }

    fn row_count(&self) -> usize {
        let Some(snapshot) = &self.snapshot else {
            return 0;
        };
        match self.current_tab {
            Tab::Accounts => snapshot.accounts.len(),
            Tab::Sources => snapshot.sources.len(),
            _ => 0,
        }
    }
}
