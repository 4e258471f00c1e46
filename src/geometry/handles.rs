use egui::{CursorIcon, Pos2, Rect};

/// One of the eight grips around a shape's bounding box
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResizeHandle {
    TopLeft,
    Top,
    TopRight,
    Right,
    BottomRight,
    Bottom,
    BottomLeft,
    Left,
}

impl ResizeHandle {
    pub const CORNERS: [ResizeHandle; 4] = [
        ResizeHandle::TopLeft,
        ResizeHandle::TopRight,
        ResizeHandle::BottomRight,
        ResizeHandle::BottomLeft,
    ];

    pub const EDGES: [ResizeHandle; 4] = [
        ResizeHandle::Top,
        ResizeHandle::Right,
        ResizeHandle::Bottom,
        ResizeHandle::Left,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::TopLeft => "top_left",
            Self::Top => "top",
            Self::TopRight => "top_right",
            Self::Right => "right",
            Self::BottomRight => "bottom_right",
            Self::Bottom => "bottom",
            Self::BottomLeft => "bottom_left",
            Self::Left => "left",
        }
    }

    pub fn cursor_icon(&self) -> CursorIcon {
        match self {
            Self::TopLeft | Self::BottomRight => CursorIcon::ResizeNwSe,
            Self::TopRight | Self::BottomLeft => CursorIcon::ResizeNeSw,
            Self::Top | Self::Bottom => CursorIcon::ResizeVertical,
            Self::Left | Self::Right => CursorIcon::ResizeHorizontal,
        }
    }

    pub fn is_corner(&self) -> bool {
        self.moves_x() && self.moves_y()
    }

    /// Dragging this handle changes the left edge
    pub fn moves_left(&self) -> bool {
        matches!(self, Self::TopLeft | Self::Left | Self::BottomLeft)
    }

    pub fn moves_right(&self) -> bool {
        matches!(self, Self::TopRight | Self::Right | Self::BottomRight)
    }

    pub fn moves_top(&self) -> bool {
        matches!(self, Self::TopLeft | Self::Top | Self::TopRight)
    }

    pub fn moves_bottom(&self) -> bool {
        matches!(self, Self::BottomLeft | Self::Bottom | Self::BottomRight)
    }

    pub fn moves_x(&self) -> bool {
        self.moves_left() || self.moves_right()
    }

    pub fn moves_y(&self) -> bool {
        self.moves_top() || self.moves_bottom()
    }

    /// Where the handle sits on `rect`
    pub fn position(&self, rect: Rect) -> Pos2 {
        match self {
            Self::TopLeft => rect.left_top(),
            Self::Top => rect.center_top(),
            Self::TopRight => rect.right_top(),
            Self::Right => rect.right_center(),
            Self::BottomRight => rect.right_bottom(),
            Self::Bottom => rect.center_bottom(),
            Self::BottomLeft => rect.left_bottom(),
            Self::Left => rect.left_center(),
        }
    }

    /// The handle that stays put while this one is dragged
    pub fn opposite(&self) -> ResizeHandle {
        match self {
            Self::TopLeft => Self::BottomRight,
            Self::Top => Self::Bottom,
            Self::TopRight => Self::BottomLeft,
            Self::Right => Self::Left,
            Self::BottomRight => Self::TopLeft,
            Self::Bottom => Self::Top,
            Self::BottomLeft => Self::TopRight,
            Self::Left => Self::Right,
        }
    }
}
