/*!
 * Interactive selection session
 *
 * [`Session`] is the state machine behind the terminal UI: it owns the tree,
 * the visible sequence, the cursor and the scroll window, and turns input
 * [`Event`]s into mutations. It knows nothing about terminals; [`run`] drives
 * it with any [`EventSource`] and [`Renderer`].
 */

use log::{debug, trace};
use strum::{EnumIter, IntoEnumIterator};

use crate::error::Result;
use crate::tree::Tree;
use crate::types::{NodeId, NodeKind, Outcome};

/// Lines reserved for the status bar and the key help
const CHROME_LINES: u16 = 2;

/// User intents, in the order they are listed in the key help
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter)]
pub enum Command {
    Up,
    Down,
    Collapse,
    Expand,
    Toggle,
    Confirm,
    Quit,
}

impl Command {
    /// Key shown in the help line
    pub fn key_label(self) -> &'static str {
        match self {
            Command::Up => "↑",
            Command::Down => "↓",
            Command::Collapse => "←",
            Command::Expand => "→",
            Command::Toggle => "space",
            Command::Confirm => "enter",
            Command::Quit => "q/esc",
        }
    }

    /// Action shown in the help line
    pub fn description(self) -> &'static str {
        match self {
            Command::Up => "up",
            Command::Down => "down",
            Command::Collapse => "collapse",
            Command::Expand => "expand",
            Command::Toggle => "toggle",
            Command::Confirm => "build",
            Command::Quit => "quit",
        }
    }
}

/// Input accepted by a session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    /// A mapped key press
    Command(Command),
    /// The terminal changed size
    Resize { width: u16, height: u16 },
}

/// Labels for the status bar
#[derive(Debug, Clone, Copy, Default)]
pub struct StatusInfo {
    /// Files come from a Git listing rather than a directory walk
    pub in_repo: bool,
    /// Binary files may be selected
    pub allow_binary: bool,
}

/// Display state of one visible row
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowKind {
    Directory { expanded: bool },
    File { selected: bool },
}

/// One row of the visible window
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row<'a> {
    pub name: &'a str,
    pub depth: usize,
    pub kind: RowKind,
    pub is_cursor: bool,
}

impl Row<'_> {
    /// Expand icon or checkbox
    pub fn marker(&self) -> &'static str {
        match self.kind {
            RowKind::Directory { expanded: true } => "▾",
            RowKind::Directory { expanded: false } => "▸",
            RowKind::File { selected: true } => "[x]",
            RowKind::File { selected: false } => "[ ]",
        }
    }

    /// Plain-text rendering: cursor mark, two spaces per level, marker, name
    pub fn to_line(&self) -> String {
        let cursor = if self.is_cursor { ">" } else { " " };
        let suffix = match self.kind {
            RowKind::Directory { .. } => "/",
            RowKind::File { .. } => "",
        };
        format!(
            "{}{}{} {}{}",
            cursor,
            "  ".repeat(self.depth),
            self.marker(),
            self.name,
            suffix
        )
    }
}

/// Everything a renderer needs for one frame
#[derive(Debug, Clone)]
pub struct View<'a> {
    /// Status bar text
    pub status: String,
    /// Rows inside the scroll window
    pub rows: Vec<Row<'a>>,
    /// `(key, action)` pairs for the help line
    pub help: Vec<(&'static str, &'static str)>,
}

impl View<'_> {
    /// Help line as a single string
    pub fn help_line(&self) -> String {
        self.help
            .iter()
            .map(|(key, action)| format!("{} {}", key, action))
            .collect::<Vec<_>>()
            .join(" • ")
    }
}

/// Draws a [`View`]
pub trait Renderer {
    fn render(&mut self, view: &View<'_>) -> Result<()>;
}

/// Blocks until the next relevant input event
pub trait EventSource {
    fn next_event(&mut self) -> Result<Event>;
}

/// State of one interactive selection session
#[derive(Debug, Clone)]
pub struct Session {
    tree: Tree,
    visible: Vec<NodeId>,
    cursor: usize,
    offset: usize,
    width: u16,
    height: u16,
    selected_count: usize,
    outcome: Outcome,
    status: StatusInfo,
}

impl Session {
    /// Start a session over `tree` in a terminal of the given size
    pub fn new(tree: Tree, status: StatusInfo, width: u16, height: u16) -> Self {
        let visible = tree.flatten();
        let mut session = Self {
            tree,
            visible,
            cursor: 0,
            offset: 0,
            width,
            height,
            selected_count: 0,
            outcome: Outcome::Running,
            status,
        };
        session.ensure_cursor_visible();
        session
    }

    pub fn outcome(&self) -> Outcome {
        self.outcome
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn selected_count(&self) -> usize {
        self.selected_count
    }

    pub fn visible(&self) -> &[NodeId] {
        &self.visible
    }

    pub fn tree(&self) -> &Tree {
        &self.tree
    }

    pub fn width(&self) -> u16 {
        self.width
    }

    /// Rows available for the tree
    pub fn viewport_height(&self) -> usize {
        usize::from(self.height.saturating_sub(CHROME_LINES).max(1))
    }

    /// Node under the cursor
    pub fn current(&self) -> NodeId {
        self.visible[self.cursor]
    }

    /// Selected file paths, sorted
    pub fn selected_paths(&self) -> Vec<String> {
        self.tree.selected_paths()
    }

    /// Apply one event. Sessions that already ended ignore input.
    pub fn handle(&mut self, event: Event) {
        if self.outcome.is_terminal() {
            return;
        }
        trace!("Event {:?} at cursor {}", event, self.cursor);

        match event {
            Event::Resize { width, height } => {
                self.width = width;
                self.height = height;
                self.ensure_cursor_visible();
            }
            Event::Command(Command::Quit) => {
                debug!("Session aborted");
                self.outcome = Outcome::Aborted;
            }
            Event::Command(Command::Confirm) => {
                debug!("Session confirmed with {} files", self.selected_count);
                self.outcome = Outcome::Confirmed;
            }
            Event::Command(Command::Up) => {
                self.cursor = self.cursor.saturating_sub(1);
                self.ensure_cursor_visible();
            }
            Event::Command(Command::Down) => {
                if self.cursor + 1 < self.visible.len() {
                    self.cursor += 1;
                }
                self.ensure_cursor_visible();
            }
            Event::Command(Command::Expand) => self.set_expanded(true),
            Event::Command(Command::Collapse) => self.set_expanded(false),
            Event::Command(Command::Toggle) => self.toggle(),
        }
    }

    /// Expand or collapse the directory under the cursor, keeping the
    /// cursor on it
    fn set_expanded(&mut self, expanded: bool) {
        let id = self.current();
        let node = self.tree.node(id);
        if !node.is_dir() || node.children.is_empty() || node.expanded == expanded {
            return;
        }

        self.tree.set_expanded(id, expanded);
        self.visible = self.tree.flatten();
        self.cursor = Tree::locate(&self.visible, id);
        self.ensure_cursor_visible();
    }

    fn toggle(&mut self) {
        let id = self.current();
        if self.tree.node(id).kind != NodeKind::File {
            return;
        }

        if self.tree.toggle_selected(id) {
            self.selected_count += 1;
        } else {
            self.selected_count -= 1;
        }
    }

    /// Clamp the cursor to the visible sequence and scroll so that
    /// `offset <= cursor < offset + viewport_height`
    fn ensure_cursor_visible(&mut self) {
        let height = self.viewport_height();
        let len = self.visible.len();

        self.cursor = self.cursor.min(len.saturating_sub(1));

        if self.cursor < self.offset {
            self.offset = self.cursor;
        }
        if self.cursor >= self.offset + height {
            self.offset = self.cursor + 1 - height;
        }
        self.offset = self.offset.min(len.saturating_sub(height));
    }

    fn status_line(&self) -> String {
        format!(
            "{} | {} | selected={}",
            if self.status.in_repo { "git" } else { "fs" },
            if self.status.allow_binary {
                "text+bin"
            } else {
                "text"
            },
            self.selected_count
        )
    }

    /// Snapshot of the scroll window for rendering
    pub fn view(&self) -> View<'_> {
        let end = (self.offset + self.viewport_height()).min(self.visible.len());

        let rows = (self.offset..end)
            .map(|i| {
                let node = self.tree.node(self.visible[i]);
                let kind = match node.kind {
                    NodeKind::Directory => RowKind::Directory {
                        expanded: node.expanded,
                    },
                    NodeKind::File => RowKind::File {
                        selected: node.selected,
                    },
                };
                Row {
                    name: &node.name,
                    depth: node.depth,
                    kind,
                    is_cursor: i == self.cursor,
                }
            })
            .collect();

        View {
            status: self.status_line(),
            rows,
            help: Command::iter()
                .map(|c| (c.key_label(), c.description()))
                .collect(),
        }
    }
}

/// Render, read, apply; until the session is aborted or confirmed
pub fn run<E, R>(session: &mut Session, events: &mut E, renderer: &mut R) -> Result<Outcome>
where
    E: EventSource,
    R: Renderer,
{
    while !session.outcome().is_terminal() {
        renderer.render(&session.view())?;
        let event = events.next_event()?;
        session.handle(event);
    }
    Ok(session.outcome())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::MkctxError;
    use crate::tree::build_tree;
    use std::collections::VecDeque;

    use Command::*;

    fn session(paths: &[&str], height: u16) -> Session {
        let tree = build_tree(".", paths).unwrap();
        Session::new(tree, StatusInfo::default(), 80, height)
    }

    fn press(session: &mut Session, commands: &[Command]) {
        for &c in commands {
            session.handle(Event::Command(c));
            assert_window(session);
        }
    }

    fn assert_window(session: &Session) {
        let h = session.viewport_height();
        let len = session.visible().len();
        assert!(session.cursor() < len);
        assert!(session.offset() <= session.cursor());
        assert!(session.cursor() < session.offset() + h);
        assert!(session.offset() <= len.saturating_sub(h));
    }

    fn current_path(session: &Session) -> String {
        session.tree().node(session.current()).path.clone()
    }

    struct Script(VecDeque<Event>);

    impl EventSource for Script {
        fn next_event(&mut self) -> Result<Event> {
            self.0
                .pop_front()
                .ok_or_else(|| MkctxError::EventSource("script exhausted".to_string()))
        }
    }

    #[derive(Default)]
    struct Recorder {
        frames: Vec<Vec<String>>,
    }

    impl Renderer for Recorder {
        fn render(&mut self, view: &View<'_>) -> Result<()> {
            let mut lines = vec![view.status.clone()];
            lines.extend(view.rows.iter().map(Row::to_line));
            lines.push(view.help_line());
            self.frames.push(lines);
            Ok(())
        }
    }

    #[test]
    fn test_cursor_is_clamped() {
        let mut s = session(&["a.txt", "b.txt"], 20);
        press(&mut s, &[Up, Up]);
        assert_eq!(s.cursor(), 0);
        press(&mut s, &[Down, Down, Down, Down]);
        assert_eq!(s.cursor(), 2);
        assert_eq!(current_path(&s), "b.txt");
    }

    #[test]
    fn test_scrolling_follows_cursor() {
        let paths: Vec<String> = (0..10).map(|i| format!("f{}.txt", i)).collect();
        let refs: Vec<&str> = paths.iter().map(String::as_str).collect();
        // 5 rows of terminal leave 3 for the tree
        let mut s = session(&refs, 5);
        assert_eq!(s.viewport_height(), 3);

        press(&mut s, &[Down; 5]);
        assert_eq!(s.cursor(), 5);
        assert_eq!(s.offset(), 3);

        press(&mut s, &[Up; 4]);
        assert_eq!(s.cursor(), 1);
        assert_eq!(s.offset(), 1);
    }

    #[test]
    fn test_tiny_terminal_keeps_one_row() {
        let mut s = session(&["a.txt", "b.txt", "c.txt"], 1);
        assert_eq!(s.viewport_height(), 1);
        press(&mut s, &[Down, Down]);
        assert_eq!(s.offset(), 2);
        assert_eq!(s.view().rows.len(), 1);
    }

    #[test]
    fn test_resize_reclamps_scroll() {
        let paths: Vec<String> = (0..10).map(|i| format!("f{}.txt", i)).collect();
        let refs: Vec<&str> = paths.iter().map(String::as_str).collect();
        let mut s = session(&refs, 30);
        press(&mut s, &[Down; 9]);
        assert_eq!(s.offset(), 0);

        s.handle(Event::Resize {
            width: 40,
            height: 6,
        });
        assert_window(&s);
        assert_eq!(s.width(), 40);
        assert_eq!(s.offset(), 6);

        s.handle(Event::Resize {
            width: 40,
            height: 50,
        });
        assert_window(&s);
        assert_eq!(s.offset(), 0);
    }

    #[test]
    fn test_collapse_keeps_cursor_on_directory() {
        let mut s = session(&["a/x.txt", "a/y.txt", "b/z.txt"], 20);
        press(&mut s, &[Down, Down, Down, Down]);
        assert_eq!(current_path(&s), "b");
        press(&mut s, &[Up, Up, Up]);
        assert_eq!(current_path(&s), "a");

        press(&mut s, &[Collapse]);
        assert_eq!(current_path(&s), "a");
        assert_eq!(s.visible().len(), 4);

        // Collapsing again or from a file does nothing
        press(&mut s, &[Collapse]);
        assert_eq!(s.visible().len(), 4);

        press(&mut s, &[Expand]);
        assert_eq!(current_path(&s), "a");
        assert_eq!(s.visible().len(), 6);
    }

    #[test]
    fn test_collapse_on_file_is_ignored() {
        let mut s = session(&["a/x.txt"], 20);
        press(&mut s, &[Down, Down]);
        assert_eq!(current_path(&s), "a/x.txt");
        let before = s.visible().to_vec();
        press(&mut s, &[Collapse, Expand]);
        assert_eq!(s.visible(), &before[..]);
    }

    #[test]
    fn test_collapse_scrolled_list_keeps_cursor_visible() {
        let mut paths: Vec<String> = (0..20).map(|i| format!("a/f{:02}.txt", i)).collect();
        paths.push("z.txt".to_string());
        let refs: Vec<&str> = paths.iter().map(String::as_str).collect();
        let mut s = session(&refs, 7);

        press(&mut s, &[Down; 15]);
        press(&mut s, &[Up; 14]);
        assert_eq!(current_path(&s), "a");
        press(&mut s, &[Collapse]);
        assert_eq!(s.visible().len(), 3);
        assert_eq!(s.offset(), 0);
    }

    #[test]
    fn test_toggle_twice_restores_state() {
        let mut s = session(&["a.txt", "b/c.txt"], 20);
        press(&mut s, &[Down, Down]);
        assert_eq!(current_path(&s), "b/c.txt");

        press(&mut s, &[Toggle]);
        assert_eq!(s.selected_count(), 1);
        assert!(s.tree().node(s.current()).selected);

        press(&mut s, &[Toggle]);
        assert_eq!(s.selected_count(), 0);
        assert!(!s.tree().node(s.current()).selected);
    }

    #[test]
    fn test_toggle_on_directory_is_ignored() {
        let mut s = session(&["b/c.txt"], 20);
        press(&mut s, &[Down, Toggle]);
        assert_eq!(current_path(&s), "b");
        assert_eq!(s.selected_count(), 0);
        assert!(s.selected_paths().is_empty());
    }

    #[test]
    fn test_selection_survives_collapse() {
        let mut s = session(&["b/c.txt", "b/d.txt"], 20);
        press(&mut s, &[Down, Down, Toggle, Up, Collapse]);
        assert_eq!(s.selected_count(), 1);
        assert_eq!(s.selected_paths(), vec!["b/c.txt"]);
    }

    #[test]
    fn test_selection_order_is_sorted() {
        let mut s = session(&["a.go", "dir/b.md", "c.rs"], 20);
        // visible: ., dir, dir/b.md, a.go, c.rs
        press(&mut s, &[Down, Down, Down, Down, Toggle, Up, Up, Toggle, Down, Toggle]);
        assert_eq!(s.selected_count(), 3);
        assert_eq!(s.selected_paths(), vec!["a.go", "c.rs", "dir/b.md"]);
    }

    #[test]
    fn test_terminal_states_ignore_input() {
        let mut s = session(&["a.txt"], 20);
        press(&mut s, &[Quit]);
        assert_eq!(s.outcome(), Outcome::Aborted);
        press(&mut s, &[Down, Toggle, Confirm]);
        assert_eq!(s.outcome(), Outcome::Aborted);
        assert_eq!(s.cursor(), 0);
        assert_eq!(s.selected_count(), 0);

        let mut s = session(&["a.txt"], 20);
        press(&mut s, &[Down, Toggle, Confirm, Toggle, Quit]);
        assert_eq!(s.outcome(), Outcome::Confirmed);
        assert_eq!(s.selected_paths(), vec!["a.txt"]);
    }

    #[test]
    fn test_view_rows() {
        let tree = build_tree(".", &["src/main.rs", "README.md"]).unwrap();
        let status = StatusInfo {
            in_repo: true,
            allow_binary: false,
        };
        let mut s = Session::new(tree, status, 80, 20);
        press(&mut s, &[Down, Down, Toggle]);

        let view = s.view();
        let lines: Vec<String> = view.rows.iter().map(Row::to_line).collect();
        assert_eq!(view.status, "git | text | selected=1");
        assert_eq!(lines, vec![" ▾ ./", "   ▾ src/", ">    [x] main.rs", "   [ ] README.md"]);
        assert_eq!(
            view.help_line(),
            "↑ up • ↓ down • ← collapse • → expand • space toggle • enter build • q/esc quit"
        );
    }

    #[test]
    fn test_run_until_confirmed() {
        let mut s = session(&["a.go", "dir/b.md"], 20);
        let mut script = Script(
            [Down, Down, Toggle, Down, Toggle, Confirm, Down]
                .into_iter()
                .map(Event::Command)
                .collect(),
        );
        let mut recorder = Recorder::default();

        let outcome = run(&mut s, &mut script, &mut recorder).unwrap();
        assert_eq!(outcome, Outcome::Confirmed);
        assert_eq!(recorder.frames.len(), 6);
        assert_eq!(script.0.len(), 1);
        assert_eq!(s.selected_paths(), vec!["a.go", "dir/b.md"]);
        assert_eq!(recorder.frames[5][0], "fs | text | selected=2");
    }

    #[test]
    fn test_run_propagates_source_errors() {
        let mut s = session(&["a.go"], 20);
        let mut script = Script(VecDeque::from([Event::Command(Down)]));
        let mut recorder = Recorder::default();
        let err = run(&mut s, &mut script, &mut recorder).unwrap_err();
        assert!(matches!(err, MkctxError::EventSource(_)));
        assert_eq!(s.outcome(), Outcome::Running);
    }
}
