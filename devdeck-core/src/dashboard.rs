//! Dashboard state machine
//!
//! One event in, at most one effect out. The event loop owns a [`Dashboard`]
//! exclusively, feeds it input/tick/worker events in arrival order, and
//! dispatches whatever effect comes back. Nothing here touches the terminal
//! or spawns work.

use crate::catalog::{ActionId, Catalog, CommandEntry, ServiceEntry, ServiceStatus};
use crate::logbuf::LogBuffer;
use crate::view::{ListEntry, ListView};

/// Fixed rows around the content area: header, tab bar, footer
const CHROME_ROWS: u16 = 3;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Tab {
    Services,
    Commands,
    Logs,
}

impl Tab {
    pub fn all() -> [Tab; 3] {
        [Tab::Services, Tab::Commands, Tab::Logs]
    }

    pub fn label(&self) -> &'static str {
        match self {
            Tab::Services => "Services",
            Tab::Commands => "Commands",
            Tab::Logs => "Logs",
        }
    }

    pub fn next(&self) -> Tab {
        match self {
            Tab::Services => Tab::Commands,
            Tab::Commands => Tab::Logs,
            Tab::Logs => Tab::Services,
        }
    }
}

/// Terminal-free key abstraction; the cli maps crossterm events onto it
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InputKey {
    Tab,
    Enter,
    Esc,
    Up,
    Down,
    PageUp,
    PageDown,
    Home,
    End,
    Backspace,
    Char(char),
    /// Ctrl-C
    Interrupt,
}

/// Everything that can happen to the dashboard
#[derive(Clone, Debug)]
pub enum DashboardEvent {
    Key(InputKey),
    Resize {
        width: u16,
        height: u16,
    },
    /// Spinner heartbeat
    Tick,
    /// Aggregate result of one probe batch; never partial
    StatusRefreshed {
        statuses: Vec<(String, ServiceStatus)>,
    },
    CommandFinished {
        name: String,
        output: String,
        failed: bool,
    },
}

/// Work the event loop must dispatch on the dashboard's behalf
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Effect {
    RefreshStatus,
    RunCommand { name: String, action: ActionId },
    Quit,
}

/// The whole UI state
pub struct Dashboard {
    pub tab: Tab,
    /// True while a command action is in flight; gates re-entrant Enter
    pub loading: bool,
    pub services: ListView<ServiceEntry>,
    pub commands: ListView<CommandEntry>,
    pub logs: LogBuffer,
    pub width: u16,
    pub height: u16,
    /// Spinner phase, advanced by ticks
    pub ticks: usize,
    pub catalog: Catalog,
}

impl Dashboard {
    /// Build the initial state and the effect that kicks off the first
    /// probe batch
    pub fn new(catalog: Catalog) -> (Self, Effect) {
        let services = ListView::new(catalog.services.clone());
        let commands = ListView::new(catalog.commands.clone());
        let mut logs = LogBuffer::new();
        logs.append(welcome(&catalog.name));

        let dashboard = Self {
            tab: Tab::Services,
            loading: false,
            services,
            commands,
            logs,
            width: 0,
            height: 0,
            ticks: 0,
            catalog,
        };
        (dashboard, Effect::RefreshStatus)
    }

    /// Apply one event, returning the effect to dispatch, if any
    pub fn handle(&mut self, event: DashboardEvent) -> Option<Effect> {
        match event {
            DashboardEvent::Key(key) => self.handle_key(key),
            DashboardEvent::Resize { width, height } => {
                self.width = width;
                self.height = height;
                let height = self.content_height();
                self.logs.clamp_scroll(width, height);
                None
            }
            DashboardEvent::Tick => {
                self.ticks = self.ticks.wrapping_add(1);
                None
            }
            DashboardEvent::StatusRefreshed { statuses } => {
                self.apply_statuses(&statuses);
                None
            }
            DashboardEvent::CommandFinished {
                name,
                output,
                failed,
            } => self.finish_command(&name, &output, failed),
        }
    }

    /// Rows available to the active view
    pub fn content_height(&self) -> u16 {
        self.height.saturating_sub(CHROME_ROWS)
    }

    fn handle_key(&mut self, key: InputKey) -> Option<Effect> {
        // Ctrl-C quits from anywhere, filter prompt included
        if key == InputKey::Interrupt {
            return Some(Effect::Quit);
        }

        // Tab always switches, closing an open filter prompt but keeping
        // its text applied
        if key == InputKey::Tab {
            match self.tab {
                Tab::Services => self.services.accept_filter(),
                Tab::Commands => self.commands.accept_filter(),
                Tab::Logs => {}
            }
            self.tab = self.tab.next();
            return None;
        }

        // An open filter prompt owns printable input, so 'q' and 'r' stay
        // typeable as filter text
        if self.filter_open() {
            match self.tab {
                Tab::Services => Self::filter_key(&mut self.services, key),
                Tab::Commands => Self::filter_key(&mut self.commands, key),
                Tab::Logs => {}
            }
            return None;
        }

        match key {
            InputKey::Char('q') => Some(Effect::Quit),
            InputKey::Char('r') => Some(Effect::RefreshStatus),
            InputKey::Enter => self.handle_enter(),
            _ => {
                self.delegate_key(key);
                None
            }
        }
    }

    fn handle_enter(&mut self) -> Option<Effect> {
        match self.tab {
            Tab::Commands => {
                // One command in flight at a time; extra presses are dropped
                if self.loading {
                    return None;
                }
                let entry = self.commands.selected()?;
                let name = entry.name.clone();
                let action = entry.action;
                self.loading = true;
                Some(Effect::RunCommand { name, action })
            }
            Tab::Logs => {
                let height = self.content_height();
                self.logs.scroll_to_bottom(self.width, height);
                None
            }
            Tab::Services => None,
        }
    }

    fn delegate_key(&mut self, key: InputKey) {
        let page = self.page_rows();
        match self.tab {
            Tab::Services => Self::list_key(&mut self.services, key, page),
            Tab::Commands => Self::list_key(&mut self.commands, key, page),
            Tab::Logs => self.logs_key(key),
        }
    }

    fn list_key<T: ListEntry>(list: &mut ListView<T>, key: InputKey, page: isize) {
        match key {
            InputKey::Up | InputKey::Char('k') => list.move_selection(-1),
            InputKey::Down | InputKey::Char('j') => list.move_selection(1),
            InputKey::PageUp => list.move_selection(-page),
            InputKey::PageDown => list.move_selection(page),
            InputKey::Home => list.select_first(),
            InputKey::End => list.select_last(),
            InputKey::Char('/') => list.begin_filter(),
            InputKey::Esc => list.cancel_filter(),
            _ => {}
        }
    }

    fn filter_key<T: ListEntry>(list: &mut ListView<T>, key: InputKey) {
        match key {
            InputKey::Enter => list.accept_filter(),
            InputKey::Esc => list.cancel_filter(),
            InputKey::Backspace => list.pop_filter_char(),
            InputKey::Up => list.move_selection(-1),
            InputKey::Down => list.move_selection(1),
            InputKey::Char(c) => list.push_filter_char(c),
            _ => {}
        }
    }

    fn logs_key(&mut self, key: InputKey) {
        let width = self.width;
        let height = self.content_height();
        match key {
            InputKey::Up | InputKey::Char('k') => self.logs.scroll_by(-1, width, height),
            InputKey::Down | InputKey::Char('j') => self.logs.scroll_by(1, width, height),
            InputKey::PageUp => self.logs.scroll_by(-(height as isize), width, height),
            InputKey::PageDown => self.logs.scroll_by(height as isize, width, height),
            InputKey::Home => self.logs.scroll_to_top(),
            InputKey::End => self.logs.scroll_to_bottom(width, height),
            _ => {}
        }
    }

    fn filter_open(&self) -> bool {
        match self.tab {
            Tab::Services => self.services.is_filtering(),
            Tab::Commands => self.commands.is_filtering(),
            Tab::Logs => false,
        }
    }

    fn page_rows(&self) -> isize {
        // List entries take two rows each
        (self.content_height() / 2).max(1) as isize
    }

    /// Rebuild the service list wholesale from the catalog plus one probe
    /// batch; services the batch missed fall back to unknown
    fn apply_statuses(&mut self, statuses: &[(String, ServiceStatus)]) {
        let entries = self
            .catalog
            .services
            .iter()
            .map(|svc| {
                let mut entry = svc.clone();
                entry.status = statuses
                    .iter()
                    .find(|(name, _)| *name == entry.name)
                    .map(|(_, status)| *status)
                    .unwrap_or(ServiceStatus::Unknown);
                entry
            })
            .collect();
        self.services.set_entries(entries);
    }

    fn finish_command(&mut self, name: &str, output: &str, failed: bool) -> Option<Effect> {
        self.loading = false;

        let mut block = if failed {
            format!("✗ {} failed", name)
        } else {
            format!("✓ {} completed successfully", name)
        };
        let body = output.trim_end();
        if !body.is_empty() {
            block.push('\n');
            block.push_str(body);
        }
        self.logs.append(block);
        let height = self.content_height();
        self.logs.scroll_to_bottom(self.width, height);

        // Services likely changed state, so kick off another probe batch
        Some(Effect::RefreshStatus)
    }
}

fn welcome(name: &str) -> String {
    format!(
        "Welcome to {}\n\n\
         Press 'r' to refresh service status\n\
         Press 'tab' to switch between tabs\n\
         Press 'enter' to execute commands\n\
         Press '/' to filter lists",
        name
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dashboard() -> Dashboard {
        let (mut dash, initial) = Dashboard::new(Catalog::builtin());
        assert_eq!(initial, Effect::RefreshStatus);
        dash.handle(DashboardEvent::Resize {
            width: 80,
            height: 24,
        });
        dash
    }

    fn key(dash: &mut Dashboard, key: InputKey) -> Option<Effect> {
        dash.handle(DashboardEvent::Key(key))
    }

    #[test]
    fn test_tab_cycle_returns_to_start() {
        let mut dash = dashboard();
        assert_eq!(dash.tab, Tab::Services);
        key(&mut dash, InputKey::Tab);
        assert_eq!(dash.tab, Tab::Commands);
        key(&mut dash, InputKey::Tab);
        assert_eq!(dash.tab, Tab::Logs);
        key(&mut dash, InputKey::Tab);
        assert_eq!(dash.tab, Tab::Services);
    }

    #[test]
    fn test_initial_services_are_unknown() {
        let dash = dashboard();
        assert!(
            dash.services
                .visible()
                .iter()
                .all(|s| s.status == ServiceStatus::Unknown)
        );
        assert!(!dash.loading);
    }

    #[test]
    fn test_quit_keys() {
        let mut dash = dashboard();
        assert_eq!(key(&mut dash, InputKey::Char('q')), Some(Effect::Quit));
        assert_eq!(key(&mut dash, InputKey::Interrupt), Some(Effect::Quit));
    }

    #[test]
    fn test_refresh_key_dispatches_probe_batch() {
        let mut dash = dashboard();
        assert_eq!(
            key(&mut dash, InputKey::Char('r')),
            Some(Effect::RefreshStatus)
        );
    }

    #[test]
    fn test_enter_on_commands_runs_selected() {
        let mut dash = dashboard();
        key(&mut dash, InputKey::Tab);
        key(&mut dash, InputKey::Down);
        key(&mut dash, InputKey::Down);
        key(&mut dash, InputKey::Down); // Run Tests

        let effect = key(&mut dash, InputKey::Enter);
        assert_eq!(
            effect,
            Some(Effect::RunCommand {
                name: "Run Tests".into(),
                action: ActionId::RunTests,
            })
        );
        assert!(dash.loading);
    }

    #[test]
    fn test_enter_while_loading_is_dropped() {
        let mut dash = dashboard();
        key(&mut dash, InputKey::Tab);
        assert!(key(&mut dash, InputKey::Enter).is_some());
        assert!(dash.loading);

        // Repeat presses do nothing until the running command finishes
        assert_eq!(key(&mut dash, InputKey::Enter), None);
        assert_eq!(key(&mut dash, InputKey::Enter), None);
        assert!(dash.loading);
    }

    #[test]
    fn test_enter_on_services_is_a_noop() {
        let mut dash = dashboard();
        assert_eq!(key(&mut dash, InputKey::Enter), None);
        assert!(!dash.loading);
    }

    #[test]
    fn test_enter_with_empty_selection_is_a_noop() {
        let mut dash = dashboard();
        key(&mut dash, InputKey::Tab);
        dash.commands.set_filter("no such command");
        assert_eq!(key(&mut dash, InputKey::Enter), None);
        assert!(!dash.loading);
    }

    #[test]
    fn test_command_finished_updates_log_and_refreshes() {
        let mut dash = dashboard();
        key(&mut dash, InputKey::Tab);
        key(&mut dash, InputKey::Enter);
        assert!(dash.loading);

        let effect = dash.handle(DashboardEvent::CommandFinished {
            name: "Start All Services".into(),
            output: "services up\n".into(),
            failed: false,
        });
        assert_eq!(effect, Some(Effect::RefreshStatus));
        assert!(!dash.loading);

        let lines = dash.logs.visible_lines(80, 100).join("\n");
        assert!(lines.contains("✓ Start All Services completed successfully"));
        assert!(lines.contains("services up"));

        // Viewport ends up pinned to the bottom of the log
        let total = dash.logs.total_lines(80);
        let visible = dash.content_height() as usize;
        assert_eq!(dash.logs.offset(), total.saturating_sub(visible));
    }

    #[test]
    fn test_failed_command_gets_failure_marker() {
        let mut dash = dashboard();
        dash.handle(DashboardEvent::CommandFinished {
            name: "Build Docker Images".into(),
            output: "no such builder".into(),
            failed: true,
        });
        let lines = dash.logs.visible_lines(80, 100).join("\n");
        assert!(lines.contains("✗ Build Docker Images failed"));
        assert!(lines.contains("no such builder"));
    }

    #[test]
    fn test_status_batch_applies_wholesale_in_any_order() {
        let mut dash = dashboard();
        // Completion order of the probes does not matter; matching is by name
        dash.handle(DashboardEvent::StatusRefreshed {
            statuses: vec![
                ("mobile-app".into(), ServiceStatus::Stopped),
                ("message-broker".into(), ServiceStatus::Running),
                ("maps-storage".into(), ServiceStatus::Running),
                ("geography-importer".into(), ServiceStatus::Unknown),
                ("geography-dispatcher".into(), ServiceStatus::Stopped),
            ],
        });

        let by_name: Vec<(String, ServiceStatus)> = dash
            .services
            .visible()
            .iter()
            .map(|s| (s.name.clone(), s.status))
            .collect();
        assert_eq!(by_name[0], ("message-broker".into(), ServiceStatus::Running));
        assert_eq!(by_name[2], ("geography-dispatcher".into(), ServiceStatus::Stopped));
        assert_eq!(by_name[4], ("mobile-app".into(), ServiceStatus::Stopped));
    }

    #[test]
    fn test_status_batch_missing_service_falls_back_to_unknown() {
        let mut dash = dashboard();
        dash.handle(DashboardEvent::StatusRefreshed {
            statuses: vec![("message-broker".into(), ServiceStatus::Running)],
        });
        let services = dash.services.visible();
        assert_eq!(services[0].status, ServiceStatus::Running);
        assert!(
            services[1..]
                .iter()
                .all(|s| s.status == ServiceStatus::Unknown)
        );
    }

    #[test]
    fn test_status_batch_preserves_selection() {
        let mut dash = dashboard();
        key(&mut dash, InputKey::Down);
        key(&mut dash, InputKey::Down); // geography-dispatcher

        dash.handle(DashboardEvent::StatusRefreshed {
            statuses: vec![("geography-dispatcher".into(), ServiceStatus::Running)],
        });
        assert_eq!(
            dash.services.selected().map(|s| s.name.as_str()),
            Some("geography-dispatcher")
        );
    }

    #[test]
    fn test_filter_prompt_captures_global_keys() {
        let mut dash = dashboard();
        key(&mut dash, InputKey::Char('/'));
        assert!(dash.services.is_filtering());

        // 'q' and 'r' become filter text instead of quit/refresh
        assert_eq!(key(&mut dash, InputKey::Char('q')), None);
        assert_eq!(key(&mut dash, InputKey::Char('r')), None);
        assert_eq!(dash.services.filter(), "qr");

        key(&mut dash, InputKey::Esc);
        assert!(!dash.services.is_filtering());
        assert_eq!(dash.services.filter(), "");
    }

    #[test]
    fn test_tab_switch_closes_prompt_keeps_filter() {
        let mut dash = dashboard();
        key(&mut dash, InputKey::Char('/'));
        key(&mut dash, InputKey::Char('g'));
        key(&mut dash, InputKey::Char('e'));
        key(&mut dash, InputKey::Char('o'));
        assert_eq!(dash.services.visible_len(), 2);

        key(&mut dash, InputKey::Tab);
        assert_eq!(dash.tab, Tab::Commands);
        assert!(!dash.services.is_filtering());
        assert_eq!(dash.services.filter(), "geo");
        assert_eq!(dash.services.visible_len(), 2);
    }

    #[test]
    fn test_resize_updates_dims_and_reclamps_log() {
        let mut dash = dashboard();
        for i in 0..40 {
            dash.logs.append(format!("line {}", i));
        }
        dash.logs.scroll_to_bottom(80, dash.content_height());
        let deep = dash.logs.offset();

        dash.handle(DashboardEvent::Resize {
            width: 80,
            height: 60,
        });
        assert_eq!(dash.height, 60);
        assert!(dash.logs.offset() <= deep);
        let max = dash
            .logs
            .total_lines(80)
            .saturating_sub(dash.content_height() as usize);
        assert!(dash.logs.offset() <= max);
    }

    #[test]
    fn test_tick_advances_spinner_phase() {
        let mut dash = dashboard();
        let before = dash.ticks;
        dash.handle(DashboardEvent::Tick);
        dash.handle(DashboardEvent::Tick);
        assert_eq!(dash.ticks, before + 2);
    }

    #[test]
    fn test_logs_enter_jumps_to_bottom() {
        let mut dash = dashboard();
        for i in 0..50 {
            dash.logs.append(format!("line {}", i));
        }
        key(&mut dash, InputKey::Tab);
        key(&mut dash, InputKey::Tab); // Logs

        key(&mut dash, InputKey::Enter);
        let total = dash.logs.total_lines(80);
        let visible = dash.content_height() as usize;
        assert_eq!(dash.logs.offset(), total.saturating_sub(visible));
    }

    #[test]
    fn test_run_tests_end_to_end() {
        let (mut dash, initial) = Dashboard::new(Catalog::builtin());
        assert_eq!(initial, Effect::RefreshStatus);

        dash.handle(DashboardEvent::Resize {
            width: 100,
            height: 30,
        });
        key(&mut dash, InputKey::Tab);
        key(&mut dash, InputKey::Char('/'));
        for c in "tests".chars() {
            key(&mut dash, InputKey::Char(c));
        }
        key(&mut dash, InputKey::Enter); // accept filter
        assert_eq!(
            dash.commands.selected().map(|c| c.name.as_str()),
            Some("Run Tests")
        );

        let effect = key(&mut dash, InputKey::Enter);
        assert!(matches!(
            effect,
            Some(Effect::RunCommand { ref name, action: ActionId::RunTests }) if name == "Run Tests"
        ));
        assert!(dash.loading);

        let effect = dash.handle(DashboardEvent::CommandFinished {
            name: "Run Tests".into(),
            output: "ok".into(),
            failed: false,
        });
        assert_eq!(effect, Some(Effect::RefreshStatus));
        assert!(!dash.loading);
        let lines = dash.logs.visible_lines(100, 100).join("\n");
        assert!(lines.contains("ok"));
    }
}
