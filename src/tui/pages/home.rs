use super::{Page, PageContext, PageKind, help_dialog_action, scroll_into_view, stack_layout};
use crate::tui::components::{FocusRing, HelpDialog, ModalController, RevealTracker};
use crate::tui::{Action, Theme};
use color_eyre::Result;
use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Position, Rect},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph, Wrap},
};
use std::time::Duration;
use tracing::debug;

/// Delay between the reveal of consecutive feature cards
pub const CARD_STAGGER: Duration = Duration::from_millis(200);

const CARD_HEIGHT: u16 = 6;

struct FeatureCard {
    title: &'static str,
    description: &'static str,
    button: &'static str,
    target: PageKind,
}

const CARDS: [FeatureCard; 3] = [
    FeatureCard {
        title: "Missense analysis",
        description: "Build reference and mutated peptide databases from missense SNPs \
                      listed as protein, SNP, reference residue, position and variant.",
        button: "Start analysis",
        target: PageKind::Missense,
    },
    FeatureCard {
        title: "Table viewer",
        description: "Browse proteomics workbooks sheet by sheet, add gene and protein \
                      annotations, remove contaminants and download the result.",
        button: "Open viewer",
        target: PageKind::Table,
    },
    FeatureCard {
        title: "About",
        description: "What BioMutate is for, the tools behind it and how to get in touch.",
        button: "Learn more",
        target: PageKind::About,
    },
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum HomeModal {
    Help,
}

/// Landing page with one card per tool
pub struct HomePage {
    focus: FocusRing,
    /// False until Tab or skip-to-content moves focus into the cards
    content_focused: bool,
    first_visible: usize,
    viewport_height: u16,
    visible: Vec<usize>,
    card_areas: Vec<(usize, Rect)>,
    reveal: RevealTracker,
    modals: ModalController<HomeModal>,
    help: Option<HelpDialog>,
    supported_actions: Vec<Action>,
}

impl Default for HomePage {
    fn default() -> Self {
        Self::new()
    }
}

impl HomePage {
    pub fn new() -> Self {
        Self {
            focus: FocusRing::new(CARDS.len()),
            content_focused: false,
            first_visible: 0,
            viewport_height: 0,
            visible: Vec::new(),
            card_areas: Vec::new(),
            reveal: RevealTracker::new(CARDS.len(), CARD_STAGGER),
            modals: ModalController::new(),
            help: None,
            supported_actions: vec![
                Action::FocusNext,
                Action::FocusPrev,
                Action::SkipToContent,
                Action::Activate,
                Action::MoveUp,
                Action::MoveDown,
                Action::ToggleMenu,
                Action::GoMissense,
                Action::GoTableViewer,
                Action::GoAbout,
                Action::ToggleHelp,
                Action::Quit,
            ],
        }
    }

    /// Card holding focus, if focus is inside the content
    pub fn focused_card(&self) -> Option<usize> {
        self.content_focused.then(|| self.focus.index())
    }

    pub fn is_revealed(&self, card: usize) -> bool {
        self.reveal.is_revealed(card)
    }

    pub fn help_open(&self) -> bool {
        self.modals.is_open(HomeModal::Help)
    }

    fn heights() -> [u16; 3] {
        [CARD_HEIGHT; 3]
    }

    fn keep_focus_visible(&mut self) {
        if self.viewport_height > 0 {
            self.first_visible = scroll_into_view(
                self.first_visible,
                self.focus.index(),
                &Self::heights(),
                self.viewport_height,
            );
        }
    }

    fn activate(&mut self, card: usize, ctx: &mut PageContext) {
        if let Some(card) = CARDS.get(card) {
            debug!(target_page = ?card.target, "feature card activated");
            ctx.navigate_to = Some(card.target);
        }
    }

    fn open_help(&mut self, ctx: &PageContext) {
        self.help = Some(HelpDialog::new(
            "Help",
            vec![
                "Tab moves between the feature cards; Enter or Space opens the focused tool."
                    .to_string(),
            ],
            &self.supported_actions,
            &ctx.keybindings,
        ));
        self.modals
            .show(HomeModal::Help, HelpDialog::FOCUSABLES, self.focused_card());
    }

    fn close_help(&mut self) {
        if let Some(opener) = self.modals.hide(HomeModal::Help) {
            self.content_focused = true;
            self.focus.focus(opener);
        }
        self.help = None;
    }

    fn render_card(&self, frame: &mut Frame, index: usize, area: Rect, theme: &Theme) {
        let focused = self.focused_card() == Some(index);
        if !self.reveal.is_revealed(index) {
            let placeholder = Block::default()
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .border_style(theme.muted_style());
            frame.render_widget(placeholder, area);
            return;
        }

        let card = &CARDS[index];
        let block = Block::default()
            .title(Span::styled(format!(" {} ", card.title), theme.header_style()))
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(theme.block_border(focused));
        let button_style = if focused {
            theme.selected_style()
        } else {
            theme.active_style()
        };
        let text = vec![
            Line::from(card.description),
            Line::from(Span::styled(format!("[ {} ]", card.button), button_style)),
        ];
        frame.render_widget(
            Paragraph::new(text)
                .block(block)
                .style(theme.normal_style())
                .wrap(Wrap { trim: true }),
            area,
        );
    }
}

impl Page for HomePage {
    fn kind(&self) -> PageKind {
        PageKind::Home
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
            Action::FocusNext => {
                if self.content_focused {
                    self.focus.next();
                } else {
                    self.content_focused = true;
                    self.focus.first();
                }
                self.keep_focus_visible();
            }
            Action::FocusPrev => {
                if self.content_focused {
                    self.focus.prev();
                } else {
                    self.content_focused = true;
                    self.focus.focus(CARDS.len() - 1);
                }
                self.keep_focus_visible();
            }
            Action::SkipToContent => {
                self.content_focused = true;
                self.focus.first();
                self.first_visible = 0;
            }
            Action::Activate | Action::Toggle if self.content_focused => {
                self.activate(self.focus.index(), ctx);
            }
            Action::MoveDown => {
                self.first_visible = (self.first_visible + 1).min(CARDS.len() - 1);
            }
            Action::MoveUp => {
                self.first_visible = self.first_visible.saturating_sub(1);
            }
            Action::ToggleHelp => self.open_help(ctx),
            _ => return Ok(false),
        }
        Ok(true)
    }

    fn handle_click(&mut self, column: u16, row: u16, ctx: &mut PageContext) -> Result<bool> {
        if self.modals.is_any_open() {
            if self.modals.handle_click(column, row).is_some() {
                self.help = None;
            }
            return Ok(true);
        }
        let position = Position::new(column, row);
        let hit = self
            .card_areas
            .iter()
            .find(|(_, area)| area.contains(position))
            .map(|(index, _)| *index);
        match hit {
            Some(index) => {
                self.content_focused = true;
                self.focus.focus(index);
                self.activate(index, ctx);
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
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(4), Constraint::Min(1)])
            .split(area);

        let hero = vec![
            Line::from(Span::styled("BioMutate", theme.header_style())).centered(),
            Line::from("Missense mutation and proteomics table tools").centered(),
            Line::from(Span::styled(
                "Tab: next card   Enter: open   ?: help",
                theme.muted_style(),
            ))
            .centered(),
        ];
        frame.render_widget(Paragraph::new(hero).style(theme.normal_style()), chunks[0]);

        let cards_area = chunks[1];
        self.viewport_height = cards_area.height;
        self.card_areas = stack_layout(cards_area, &Self::heights(), self.first_visible);
        self.visible = self.card_areas.iter().map(|(i, _)| *i).collect();
        for (index, card_area) in self.card_areas.clone() {
            self.render_card(frame, index, card_area, theme);
        }

        if let (Some(help), Some(focused)) =
            (self.help.as_mut(), self.modals.focused(HomeModal::Help))
        {
            let modal_area = help.render(frame, area, theme, focused);
            self.modals.record_area(HomeModal::Help, modal_area);
        }
    }

    fn supported_actions(&self) -> &[Action] {
        &self.supported_actions
    }
}
