use super::{Page, PageContext, PageKind, help_dialog_action, scroll_into_view, stack_layout};
use crate::tui::components::{FocusRing, HelpDialog, ModalController, RevealTracker};
use crate::tui::{Action, Theme};
use color_eyre::Result;
use ratatui::{
    Frame,
    layout::{Position, Rect},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph, Wrap},
};
use std::time::Duration;

/// Delay between the reveal of consecutive sections
pub const SECTION_STAGGER: Duration = Duration::from_millis(100);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Mission,
    Feature,
    Technology,
    Contact,
}

struct AboutItem {
    section: Section,
    title: &'static str,
    body: &'static str,
    height: u16,
}

const ITEMS: [AboutItem; 7] = [
    AboutItem {
        section: Section::Mission,
        title: "Our mission",
        body: "BioMutate collects the small tools proteogenomics work keeps needing: turning \
               missense variants into searchable peptide databases and getting proteomics \
               result tables ready for analysis.",
        height: 6,
    },
    AboutItem {
        section: Section::Feature,
        title: "Peptide databases",
        body: "Reference and mutated peptide sequences generated from RefSeq proteins and SNP lists.",
        height: 4,
    },
    AboutItem {
        section: Section::Feature,
        title: "Workbook viewer",
        body: "Multi-sheet tables with paging and per-sheet column selection.",
        height: 4,
    },
    AboutItem {
        section: Section::Feature,
        title: "Annotations",
        body: "Gene names and protein identifiers added on the server, sheet by sheet.",
        height: 4,
    },
    AboutItem {
        section: Section::Feature,
        title: "Clean exports",
        body: "Contaminant removal and download of the processed workbook.",
        height: 4,
    },
    AboutItem {
        section: Section::Technology,
        title: "Technology",
        body: "Data is processed on the server with Python and pandas. This client talks to \
               it over HTTP and is written in Rust with ratatui, crossterm and tokio.",
        height: 5,
    },
    AboutItem {
        section: Section::Contact,
        title: "Contact",
        body: "Questions, data issues and bug reports are welcome on the project tracker.",
        height: 4,
    },
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AboutModal {
    Help,
}

/// Project description; feature items take focus but do nothing when activated
pub struct AboutPage {
    /// Over the feature items only
    focus: FocusRing,
    content_focused: bool,
    first_visible: usize,
    viewport_height: u16,
    visible: Vec<usize>,
    item_areas: Vec<(usize, Rect)>,
    reveal: RevealTracker,
    modals: ModalController<AboutModal>,
    help: Option<HelpDialog>,
    supported_actions: Vec<Action>,
}

impl Default for AboutPage {
    fn default() -> Self {
        Self::new()
    }
}

fn feature_items() -> Vec<usize> {
    ITEMS
        .iter()
        .enumerate()
        .filter(|(_, item)| item.section == Section::Feature)
        .map(|(i, _)| i)
        .collect()
}

impl AboutPage {
    pub fn new() -> Self {
        Self {
            focus: FocusRing::new(feature_items().len()),
            content_focused: false,
            first_visible: 0,
            viewport_height: 0,
            visible: Vec::new(),
            item_areas: Vec::new(),
            reveal: RevealTracker::new(ITEMS.len(), SECTION_STAGGER),
            modals: ModalController::new(),
            help: None,
            supported_actions: vec![
                Action::FocusNext,
                Action::FocusPrev,
                Action::SkipToContent,
                Action::MoveUp,
                Action::MoveDown,
                Action::ToggleMenu,
                Action::GoHome,
                Action::GoMissense,
                Action::GoTableViewer,
                Action::ToggleHelp,
                Action::Quit,
            ],
        }
    }

    /// Index into the page items of the focused feature
    pub fn focused_item(&self) -> Option<usize> {
        if !self.content_focused {
            return None;
        }
        feature_items().get(self.focus.index()).copied()
    }

    pub fn is_revealed(&self, item: usize) -> bool {
        self.reveal.is_revealed(item)
    }

    pub fn first_visible(&self) -> usize {
        self.first_visible
    }

    fn heights() -> Vec<u16> {
        ITEMS.iter().map(|item| item.height).collect()
    }

    fn keep_focus_visible(&mut self) {
        if let (Some(item), true) = (self.focused_item(), self.viewport_height > 0) {
            self.first_visible =
                scroll_into_view(self.first_visible, item, &Self::heights(), self.viewport_height);
        }
    }

    fn open_help(&mut self, ctx: &PageContext) {
        self.help = Some(HelpDialog::new(
            "Help",
            vec!["Scroll with the arrow keys; Tab moves between the feature items.".to_string()],
            &self.supported_actions,
            &ctx.keybindings,
        ));
        let opener = self.content_focused.then(|| self.focus.index());
        self.modals.show(AboutModal::Help, HelpDialog::FOCUSABLES, opener);
    }

    fn close_help(&mut self) {
        if let Some(opener) = self.modals.hide(AboutModal::Help) {
            self.content_focused = true;
            self.focus.focus(opener);
        }
        self.help = None;
    }

    fn render_item(&self, frame: &mut Frame, index: usize, area: Rect, theme: &Theme) {
        let item = &ITEMS[index];
        if !self.reveal.is_revealed(index) {
            frame.render_widget(
                Block::default()
                    .borders(Borders::ALL)
                    .border_type(BorderType::Rounded)
                    .border_style(theme.muted_style()),
                area,
            );
            return;
        }
        let focused = self.focused_item() == Some(index);
        let borders = match item.section {
            Section::Feature => Borders::ALL,
            _ => Borders::TOP,
        };
        let block = Block::default()
            .title(Span::styled(format!(" {} ", item.title), theme.header_style()))
            .borders(borders)
            .border_type(BorderType::Rounded)
            .border_style(theme.block_border(focused));
        frame.render_widget(
            Paragraph::new(Line::from(item.body))
                .block(block)
                .style(theme.normal_style())
                .wrap(Wrap { trim: true }),
            area,
        );
    }
}

impl Page for AboutPage {
    fn kind(&self) -> PageKind {
        PageKind::About
    }

    fn handle_action(&mut self, action: Action, ctx: &mut PageContext) -> Result<bool> {
        if self.modals.is_any_open() {
            match action {
                Action::FocusNext => self.modals.focus_next(),
                Action::FocusPrev => self.modals.focus_prev(),
                _ => {
                    if let Some(help) = self.help.as_mut() {
                        if help_dialog_action(help, action) {
                            self.close_help();
                        }
                    }
                }
            }
            return Ok(true);
        }

        match action {
            Action::FocusNext | Action::FocusPrev | Action::SkipToContent
                if !self.content_focused =>
            {
                self.content_focused = true;
                if action == Action::FocusPrev {
                    self.focus.focus(self.focus.len().saturating_sub(1));
                } else {
                    self.focus.first();
                }
                self.keep_focus_visible();
            }
            Action::FocusNext => {
                self.focus.next();
                self.keep_focus_visible();
            }
            Action::FocusPrev => {
                self.focus.prev();
                self.keep_focus_visible();
            }
            Action::SkipToContent => {
                self.focus.first();
                self.keep_focus_visible();
            }
            // Feature items swallow activation
            Action::Activate | Action::Toggle => return Ok(self.content_focused),
            Action::MoveDown => {
                self.first_visible = (self.first_visible + 1).min(ITEMS.len() - 1);
            }
            Action::MoveUp => {
                self.first_visible = self.first_visible.saturating_sub(1);
            }
            Action::ToggleHelp => self.open_help(ctx),
            _ => return Ok(false),
        }
        Ok(true)
    }

    fn handle_click(&mut self, column: u16, row: u16, _ctx: &mut PageContext) -> Result<bool> {
        if self.modals.is_any_open() {
            if self.modals.handle_click(column, row).is_some() {
                self.help = None;
            }
            return Ok(true);
        }
        let position = Position::new(column, row);
        let features = feature_items();
        let hit = self
            .item_areas
            .iter()
            .find(|(_, area)| area.contains(position))
            .and_then(|(item, _)| features.iter().position(|f| f == item));
        match hit {
            Some(feature) => {
                self.content_focused = true;
                self.focus.focus(feature);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn tick(&mut self, ctx: &mut PageContext) -> Result<()> {
        self.reveal.observe(self.visible.iter().copied(), ctx.now);
        Ok(())
    }

    fn has_modal(&self) -> bool {
        self.modals.is_any_open()
    }

    fn close_modals(&mut self) -> bool {
        if !self.modals.is_any_open() {
            return false;
        }
        self.close_help();
        self.modals.hide_all();
        true
    }

    fn render(&mut self, frame: &mut Frame, area: Rect, theme: &Theme, _ctx: &PageContext) {
        self.viewport_height = area.height;
        self.item_areas = stack_layout(area, &Self::heights(), self.first_visible);
        self.visible = self.item_areas.iter().map(|(i, _)| *i).collect();
        for (index, item_area) in self.item_areas.clone() {
            self.render_item(frame, index, item_area, theme);
        }

        if let (Some(help), Some(focused)) =
            (self.help.as_mut(), self.modals.focused(AboutModal::Help))
        {
            let modal_area = help.render(frame, area, theme, focused);
            self.modals.record_area(AboutModal::Help, modal_area);
        }
    }

    fn supported_actions(&self) -> &[Action] {
        &self.supported_actions
    }
}
