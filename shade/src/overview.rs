use crate::rect::Rect;
use crate::space::SpaceId;
use crate::window_manager::SpaceInfo;

pub const TOP_BORDER: &str = "╔═══════════════════════════════════════╗";
pub const TITLE: &str = "║          DESKTOP OVERVIEW           ║";
pub const SEPARATOR: &str = "╟───────────────────────────────────────╢";
pub const BOTTOM_BORDER: &str = "╚═══════════════════════════════════════╝";
pub const EMPTY: &str = "║  No desktop information available    ║";

const COLUMN_WIDTH: usize = 12;
const ACTIVE_INDICATOR: &str = "► ";
const INACTIVE_INDICATOR: &str = "  ";

const CHAR_WIDTH: i32 = 8;
const LINE_HEIGHT: i32 = 17;
const PADDING: i32 = 20;
const BOTTOM_MARGIN: i32 = 60;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OverviewLine {
    pub text: String,
    pub active: bool,
}

impl OverviewLine {
    fn plain(text: &str) -> Self {
        Self {
            text: text.to_string(),
            active: false,
        }
    }

    /// The line with the active Space highlighted in green for terminals
    pub fn styled(&self, colour: bool) -> String {
        if colour && self.active {
            format!("\x1b[32m{}\x1b[0m", self.text)
        } else {
            self.text.clone()
        }
    }
}

/// Pads with spaces or truncates to exactly `width` characters
fn fit(value: &str, width: usize) -> String {
    let mut fitted = value.chars().take(width).collect::<String>();
    let len = fitted.chars().count();
    fitted.extend(std::iter::repeat_n(' ', width - len));
    fitted
}

pub struct DesktopOverview<'a> {
    spaces: &'a [SpaceInfo],
    current_space: Option<SpaceId>,
}

impl<'a> DesktopOverview<'a> {
    pub fn new(spaces: &'a [SpaceInfo], current_space: Option<SpaceId>) -> Self {
        Self {
            spaces,
            current_space,
        }
    }

    pub fn space_lines(&self) -> Vec<OverviewLine> {
        if self.spaces.is_empty() {
            return vec![OverviewLine::plain(EMPTY)];
        }

        self.spaces
            .iter()
            .map(|space| {
                let active = Some(space.id) == self.current_space;
                let indicator = if active {
                    ACTIVE_INDICATOR
                } else {
                    INACTIVE_INDICATOR
                };

                OverviewLine {
                    text: format!(
                        "║ {indicator}{} │ {} ║",
                        fit(&space.name, COLUMN_WIDTH),
                        fit(&format!("{} windows", space.window_count), COLUMN_WIDTH)
                    ),
                    active,
                }
            })
            .collect()
    }

    pub fn lines(&self) -> Vec<OverviewLine> {
        let mut lines = vec![
            OverviewLine::plain(TOP_BORDER),
            OverviewLine::plain(TITLE),
            OverviewLine::plain(SEPARATOR),
        ];
        lines.extend(self.space_lines());
        lines.push(OverviewLine::plain(BOTTOM_BORDER));

        lines
    }

    pub fn render(&self) -> String {
        self.lines()
            .iter()
            .map(|line| line.text.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Where to place the overview on a screen with a bottom-left origin
pub fn overlay_frame(screen: Rect, lines: &[OverviewLine]) -> Rect {
    let columns = lines
        .iter()
        .map(|line| line.text.chars().count())
        .max()
        .unwrap_or_default() as i32;

    screen.anchored_bottom_centre(
        columns * CHAR_WIDTH + PADDING * 2,
        lines.len() as i32 * LINE_HEIGHT + PADDING * 2,
        BOTTOM_MARGIN,
    )
}
