//! Action enum: every user intent and internal event the App dispatches.

/// All actions that can flow through the system.
/// Components produce Actions; the App dispatches them.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    // ── Scrolling ────────────────────────────────────────────────────────────
    Scroll(f32), // raw wheel delta, scaled by the scene
    DragStart { y: u16 },
    DragMove { y: u16 },
    DragEnd,

    // ── Selection ────────────────────────────────────────────────────────────
    Hover(Option<usize>), // stack position under the pointer
    Click(usize),         // stack position of a record
    ClickBackground,
    SelectFocused,
    Deselect,

    // ── UI toggles ───────────────────────────────────────────────────────────
    ToggleHelp,

    // ── System ───────────────────────────────────────────────────────────────
    Quit,
    Resize(u16, u16),
}
