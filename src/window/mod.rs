//! The window tree: how a client's screen is divided into panes, each
//! showing one buffer with its own cursors.

use crate::buffer::Buffer;
use crate::edit::Change;
use std::sync::Weak;

use crate::buffer_handle::BufferHandle;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct WindowId(pub u64);

/// A point and mark pair defining one cursor's position and (if `mark !=
/// point`) its selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cursor {
    pub point: u64,
    pub mark: u64,
}

impl Cursor {
    pub fn at(position: u64) -> Self {
        Self { point: position, mark: position }
    }

    pub fn start(&self) -> u64 {
        self.point.min(self.mark)
    }

    pub fn end(&self) -> u64 {
        self.point.max(self.mark)
    }

    pub fn has_selection(&self) -> bool {
        self.point != self.mark
    }
}

/// A leaf pane: one buffer, its cursors, and scroll position.
pub struct UnifiedWindow {
    pub id: WindowId,
    pub buffer_handle: Weak<BufferHandle>,
    pub start_position: u64,
    pub column_offset: u64,
    pub cursors: Vec<Cursor>,
    pub selected_cursor: usize,
    change_index: usize,
    pub show_marks: bool,
    pub pinned: bool,
}

impl UnifiedWindow {
    pub fn new(id: WindowId, buffer_handle: Weak<BufferHandle>) -> Self {
        Self {
            id,
            buffer_handle,
            start_position: 0,
            column_offset: 0,
            cursors: vec![Cursor::at(0)],
            selected_cursor: 0,
            change_index: 0,
            show_marks: false,
            pinned: false,
        }
    }

    pub fn selected(&self) -> Cursor {
        self.cursors[self.selected_cursor]
    }

    pub fn selected_mut(&mut self) -> &mut Cursor {
        &mut self.cursors[self.selected_cursor]
    }

    /// Replays `buffer.changes()[self.change_index..]` over every cursor
    /// and the scroll position, so a window stays aligned with a buffer
    /// that other clients (or async jobs) have been editing concurrently.
    pub fn update_cursors(&mut self, buffer: &Buffer) {
        let new_changes = &buffer.changes()[self.change_index..];
        if new_changes.is_empty() {
            return;
        }

        for cursor in &mut self.cursors {
            crate::edit::position_after_changes(new_changes, &mut cursor.point);
            crate::edit::position_after_changes(new_changes, &mut cursor.mark);
        }

        if self.show_marks {
            self.show_marks = false;
        }

        // An insert at position 0 with start_position already at 0 must
        // not push the scroll position forward: otherwise pasting a large
        // block into a freshly opened buffer scrolls the viewport past
        // the inserted text and the buffer looks empty.
        let was_at_start = self.start_position == 0;
        crate::edit::position_after_changes(new_changes, &mut self.start_position);
        if was_at_start {
            self.start_position = 0;
        }

        self.change_index = buffer.changes().len();
    }

    pub fn kill_cursor(&mut self, index: usize) {
        if self.cursors.len() <= 1 {
            return;
        }
        self.cursors.remove(index);
        if self.selected_cursor >= self.cursors.len() {
            self.selected_cursor = self.cursors.len() - 1;
        } else if self.selected_cursor > index {
            self.selected_cursor -= 1;
        }
    }

    pub fn kill_extra_cursors(&mut self) {
        let kept = self.cursors[self.selected_cursor];
        self.cursors = vec![kept];
        self.selected_cursor = 0;
    }

    /// Drops cursors that share a point with an earlier cursor, keeping
    /// the earliest occurrence of each distinct point.
    pub fn kill_cursors_at_same_point(&mut self) {
        let mut seen = std::collections::HashSet::new();
        let selected_point = self.selected().point;
        let mut new_selected = 0;
        let mut kept = Vec::with_capacity(self.cursors.len());
        for cursor in &self.cursors {
            if seen.insert(cursor.point) {
                if cursor.point == selected_point {
                    new_selected = kept.len();
                }
                kept.push(*cursor);
            }
        }
        self.cursors = kept;
        self.selected_cursor = new_selected;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SplitDirection {
    Horizontal,
    Vertical,
}

pub enum WindowNode {
    Unified(UnifiedWindow),
    Split {
        direction: SplitDirection,
        ratio: f64,
        first: Box<WindowNode>,
        second: Box<WindowNode>,
    },
}

impl WindowNode {
    fn contains(&self, id: WindowId) -> bool {
        match self {
            WindowNode::Unified(w) => w.id == id,
            WindowNode::Split { first, second, .. } => first.contains(id) || second.contains(id),
        }
    }

    pub fn find(&self, id: WindowId) -> Option<&UnifiedWindow> {
        match self {
            WindowNode::Unified(w) if w.id == id => Some(w),
            WindowNode::Unified(_) => None,
            WindowNode::Split { first, second, .. } => first.find(id).or_else(|| second.find(id)),
        }
    }

    pub fn find_mut(&mut self, id: WindowId) -> Option<&mut UnifiedWindow> {
        match self {
            WindowNode::Unified(w) if w.id == id => Some(w),
            WindowNode::Unified(_) => None,
            WindowNode::Split { first, second, .. } => {
                if first.contains(id) {
                    first.find_mut(id)
                } else {
                    second.find_mut(id)
                }
            }
        }
    }

    /// Depth-first, left-to-right list of every leaf's id.
    pub fn leaf_ids(&self) -> Vec<WindowId> {
        match self {
            WindowNode::Unified(w) => vec![w.id],
            WindowNode::Split { first, second, .. } => {
                let mut ids = first.leaf_ids();
                ids.extend(second.leaf_ids());
                ids
            }
        }
    }
}

/// A pane's on-screen rectangle, in rows/cols, produced by `WindowTree::set_size`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rect {
    pub rows: u32,
    pub cols: u32,
}

pub struct WindowTree {
    pub root: WindowNode,
    pub focused_window: WindowId,
    next_window_id: u64,
}

impl WindowTree {
    pub fn new(buffer_handle: Weak<BufferHandle>) -> Self {
        let id = WindowId(1);
        WindowTree {
            root: WindowNode::Unified(UnifiedWindow::new(id, buffer_handle)),
            focused_window: id,
            next_window_id: 2,
        }
    }

    fn alloc_id(&mut self) -> WindowId {
        let id = WindowId(self.next_window_id);
        self.next_window_id += 1;
        id
    }

    pub fn focused(&self) -> &UnifiedWindow {
        self.root.find(self.focused_window).expect("focused_window always names a live leaf")
    }

    pub fn focused_mut(&mut self) -> &mut UnifiedWindow {
        self.root.find_mut(self.focused_window).expect("focused_window always names a live leaf")
    }

    /// Splits the focused window in two, with the new pane showing
    /// `buffer_handle` and ratio 0.5 between the original and the new pane.
    pub fn split_window(&mut self, direction: SplitDirection, buffer_handle: Weak<BufferHandle>) -> WindowId {
        let new_id = self.alloc_id();
        let target = self.focused_window;

        let root = std::mem::replace(&mut self.root, WindowNode::Unified(UnifiedWindow::new(WindowId(0), Weak::new())));
        self.root = Self::replace_leaf(root, target, direction, new_id, buffer_handle);
        self.focused_window = new_id;
        new_id
    }

    fn replace_leaf(node: WindowNode, target: WindowId, direction: SplitDirection, new_id: WindowId, buffer_handle: Weak<BufferHandle>) -> WindowNode {
        match node {
            WindowNode::Unified(w) if w.id == target => WindowNode::Split {
                direction,
                ratio: 0.5,
                first: Box::new(WindowNode::Unified(w)),
                second: Box::new(WindowNode::Unified(UnifiedWindow::new(new_id, buffer_handle))),
            },
            WindowNode::Split { direction: d, ratio, first, second } => {
                if first.contains(target) {
                    WindowNode::Split {
                        direction: d,
                        ratio,
                        first: Box::new(Self::replace_leaf(*first, target, direction, new_id, buffer_handle)),
                        second,
                    }
                } else {
                    WindowNode::Split {
                        direction: d,
                        ratio,
                        first,
                        second: Box::new(Self::replace_leaf(*second, target, direction, new_id, buffer_handle)),
                    }
                }
            }
            other => other,
        }
    }

    /// Removes `target` from the tree, collapsing its parent split into
    /// whichever sibling remains. Fails (returns false) if `target` is the
    /// only window left.
    pub fn close_window(&mut self, target: WindowId) -> bool {
        if self.root.leaf_ids().len() <= 1 {
            return false;
        }
        let root = std::mem::replace(&mut self.root, WindowNode::Unified(UnifiedWindow::new(WindowId(0), Weak::new())));
        self.root = Self::remove_leaf(root, target);
        if self.focused_window == target {
            self.focused_window = *self.root.leaf_ids().first().expect("at least one window remains");
        }
        true
    }

    fn remove_leaf(node: WindowNode, target: WindowId) -> WindowNode {
        match node {
            WindowNode::Split { direction, ratio, first, second } => {
                if matches!(&*first, WindowNode::Unified(w) if w.id == target) {
                    return *second;
                }
                if matches!(&*second, WindowNode::Unified(w) if w.id == target) {
                    return *first;
                }
                WindowNode::Split {
                    direction,
                    ratio,
                    first: Box::new(Self::remove_leaf(*first, target)),
                    second: Box::new(Self::remove_leaf(*second, target)),
                }
            }
            other => other,
        }
    }

    /// Goes to the next leaf in depth-first, left-to-right order, wrapping
    /// around at the end.
    pub fn cycle_window(&mut self) {
        let ids = self.root.leaf_ids();
        let pos = ids.iter().position(|&id| id == self.focused_window).unwrap_or(0);
        self.focused_window = ids[(pos + 1) % ids.len()];
    }

    pub fn reverse_cycle_window(&mut self) {
        let ids = self.root.leaf_ids();
        let pos = ids.iter().position(|&id| id == self.focused_window).unwrap_or(0);
        self.focused_window = ids[(pos + ids.len() - 1) % ids.len()];
    }

    /// Recursively partitions `rows`/`cols` across the tree according to
    /// each split's ratio.
    pub fn set_size(&self, rows: u32, cols: u32) -> std::collections::HashMap<WindowId, Rect> {
        let mut out = std::collections::HashMap::new();
        Self::set_size_node(&self.root, rows, cols, &mut out);
        out
    }

    fn set_size_node(node: &WindowNode, rows: u32, cols: u32, out: &mut std::collections::HashMap<WindowId, Rect>) {
        match node {
            WindowNode::Unified(w) => {
                out.insert(w.id, Rect { rows, cols });
            }
            WindowNode::Split { direction, ratio, first, second } => match direction {
                SplitDirection::Horizontal => {
                    let first_cols = ((cols as f64) * ratio).round() as u32;
                    Self::set_size_node(first, rows, first_cols, out);
                    Self::set_size_node(second, rows, cols - first_cols, out);
                }
                SplitDirection::Vertical => {
                    let first_rows = ((rows as f64) * ratio).round() as u32;
                    Self::set_size_node(first, first_rows, cols, out);
                    Self::set_size_node(second, rows - first_rows, cols, out);
                }
            },
        }
    }

    /// Adjusts the ratio of the split that directly contains the focused
    /// window, along `direction`, clamped to [0.1, 0.9].
    pub fn resize_focused(&mut self, direction: SplitDirection, delta: f64) -> bool {
        Self::resize_node(&mut self.root, self.focused_window, direction, delta)
    }

    fn resize_node(node: &mut WindowNode, target: WindowId, direction: SplitDirection, delta: f64) -> bool {
        match node {
            WindowNode::Unified(_) => false,
            WindowNode::Split { direction: d, ratio, first, second } => {
                let in_first = first.contains(target);
                let in_second = second.contains(target);
                if !in_first && !in_second {
                    return false;
                }
                if *d == direction {
                    *ratio = if in_first { *ratio + delta } else { *ratio - delta }.clamp(0.1, 0.9);
                    return true;
                }
                if in_first {
                    Self::resize_node(first, target, direction, delta)
                } else {
                    Self::resize_node(second, target, direction, delta)
                }
            }
        }
    }
}
