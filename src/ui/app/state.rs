use chrono::{DateTime, Local};

/// Smallest left pane width a resize initializes to.
pub const MIN_INITIAL_LEFT: u16 = 24;
/// Floor for manual left pane resizing.
pub const MIN_LEFT: u16 = 20;
/// Columns kept free for the diff pane when bounding the left pane.
pub const RIGHT_RESERVE: u16 = 20;

/// Screen geometry and scroll positions.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Viewport {
    /// Terminal columns. Zero until the first resize.
    pub width: u16,
    /// Terminal rows.
    pub height: u16,
    /// File list width; zero until initialized from the first resize.
    pub left_width: u16,
    /// Width read from preferences, applied on the first resize.
    pub saved_left_width: Option<u16>,
    /// First visible file.
    pub left_offset: usize,
    /// First visible diff line.
    pub v_offset: usize,
    /// Horizontal scroll of the diff pane in columns.
    pub x_offset: usize,
    /// Rows available to both panes, recomputed on every reconcile.
    pub content_height: usize,
    /// Diff pane columns.
    pub right_width: usize,
    /// Hard-wrap diff lines.
    pub wrap: bool,
    /// Render old and new sides in two columns.
    pub side_by_side: bool,
}

impl Viewport {
    /// Whether a resize has been seen.
    pub fn is_sized(&self) -> bool {
        self.width > 0 && self.height > 0
    }

    /// Upper bound for the left pane at the current width.
    pub fn max_left(&self) -> u16 {
        self.width.saturating_sub(RIGHT_RESERVE).max(MIN_LEFT)
    }

    /// Clamp `width` into the range a resize may initialize to.
    pub fn clamp_initial_left(&self, width: u16) -> u16 {
        width.max(MIN_INITIAL_LEFT).min(self.max_left())
    }

    /// Left pane width used for layout.
    pub fn effective_left(&self) -> u16 {
        self.left_width.max(MIN_LEFT)
    }
}

/// Non-geometry UI state.
#[derive(Debug, Clone, Default)]
pub struct UiState {
    /// Transient status message shown in the bottom bar.
    pub status: Option<String>,
    /// Bumped whenever `status` is set; timers only clear a matching one.
    pub status_seq: u64,
    /// Whether the help overlay is shown.
    pub show_help: bool,
    /// Pending numeric prefix.
    pub key_buffer: String,
    /// Summary of HEAD.
    pub last_commit: String,
    /// Checked-out branch.
    pub branch: String,
    /// Time of the last successful file list refresh.
    pub last_refresh: Option<DateTime<Local>>,
    /// Whether a redraw is needed.
    pub dirty: bool,
}
