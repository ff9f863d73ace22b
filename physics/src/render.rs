//! Rendering hooks and the plot availability check.
//!
//! Simulation never depends on rendering: a context that is missing, closed or failing only causes plots to be
//! skipped. Renderers receive a [`HistoryView`] and can never write back into agent history.
use std::collections::{BTreeMap, BTreeSet};
use std::io::Write;

use nalgebra::Vector3;

use crate::dynamics::position;
use crate::history::HistoryView;

/// Opaque handle to something a [`RenderContext`] has drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ArtifactHandle(pub u64);

/// The plots an agent maintains.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactKind {
    /// path traced by the body's position.
    Trajectory,
    /// body axes at the latest attitude.
    BodyFrame,
}

impl ArtifactKind {
    /// every kind an agent draws, in drawing order.
    pub const ALL: [ArtifactKind; 2] = [ArtifactKind::Trajectory, ArtifactKind::BodyFrame];

    /// name of the artifact slot this kind is stored under.
    pub fn slot_name(self) -> &'static str {
        match self {
            ArtifactKind::Trajectory => "trajectory",
            ArtifactKind::BodyFrame => "body_frame",
        }
    }
}

/// Injected rendering capability. Queried explicitly; there is no global figure state.
pub trait RenderContext {
    /// whether anything can be drawn right now.
    fn is_available(&self) -> bool;

    /// whether `handle` still refers to something drawn in this context.
    fn is_live(&self, handle: ArtifactHandle) -> bool;

    /// draws a new artifact, None if drawing failed.
    fn create(&mut self, kind: ArtifactKind, history: &HistoryView<'_>) -> Option<ArtifactHandle>;

    /// redraws an existing artifact, false if drawing failed.
    fn update(&mut self, handle: ArtifactHandle, kind: ArtifactKind, history: &HistoryView<'_>) -> bool;
}

/// Named artifact slots owned by an agent. Derived data only; safe to clear at any time.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlotArtifacts {
    slots: BTreeMap<String, ArtifactHandle>,
}

impl PlotArtifacts {
    pub fn get(&self, name: &str) -> Option<ArtifactHandle> {
        self.slots.get(name).copied()
    }

    pub fn insert(&mut self, name: &str, handle: ArtifactHandle) -> Option<ArtifactHandle> {
        self.slots.insert(name.to_owned(), handle)
    }

    pub fn remove(&mut self, name: &str) -> Option<ArtifactHandle> {
        self.slots.remove(name)
    }

    pub fn clear(&mut self) {
        self.slots.clear();
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.slots.keys().map(String::as_str)
    }

    pub fn is_available(&self, context: &dyn RenderContext, name: &str) -> bool {
        //! true if the slot `name` holds a handle `context` still considers live.
        context.is_available() && self.get(name).is_some_and(|handle| context.is_live(handle))
    }
}

/// A context with no display. Never available.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeadlessContext;

impl RenderContext for HeadlessContext {
    fn is_available(&self) -> bool {
        false
    }

    fn is_live(&self, _handle: ArtifactHandle) -> bool {
        false
    }

    fn create(&mut self, _kind: ArtifactKind, _history: &HistoryView<'_>) -> Option<ArtifactHandle> {
        None
    }

    fn update(&mut self, _handle: ArtifactHandle, _kind: ArtifactKind, _history: &HistoryView<'_>) -> bool {
        false
    }
}

/// Which samples a [`TerminalContext`] prints.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrintType {
    /// time and the single state component at this index.
    GraphSingle(usize),
    /// time, position and the body x axis.
    GraphAll,
}

/// Prints artifacts as comma-separated rows, one per `print_interval` samples.
pub struct TerminalContext<W: Write> {
    out: W,
    print_type: PrintType,
    print_interval: usize,
    printed: BTreeMap<ArtifactHandle, usize>, // samples already written, per artifact
    next_handle: u64,
    closed: BTreeSet<ArtifactHandle>,
}

impl<W: Write> TerminalContext<W> {
    pub fn new(out: W, print_type: PrintType, print_interval: usize) -> Self {
        Self {
            out,
            print_type,
            print_interval: print_interval.max(1),
            printed: BTreeMap::new(),
            next_handle: 0,
            closed: BTreeSet::new(),
        }
    }

    /// forget an artifact, as if its window had been closed.
    pub fn close(&mut self, handle: ArtifactHandle) {
        self.printed.remove(&handle);
        self.closed.insert(handle);
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn write_rows(&mut self, handle: ArtifactHandle, kind: ArtifactKind, history: &HistoryView<'_>) -> std::io::Result<()> {
        //! writes the samples this artifact has not printed yet.
        let from = self.printed.get(&handle).copied().unwrap_or(0);
        let interval = self.print_interval;
        match kind {
            ArtifactKind::Trajectory => {
                for index in (from..history.len()).filter(|i| i % interval == 0) {
                    let Some((t, z, _)) = history.sample(index) else {
                        break;
                    };
                    match self.print_type {
                        PrintType::GraphSingle(component) => match z.get(component) {
                            Some(value) => writeln!(self.out, "TRJ, {t:.4}, {value}")?,
                            None => writeln!(self.out, "TRJ, {t:.4}, -")?,
                        },
                        PrintType::GraphAll => {
                            let p = position(z);
                            writeln!(self.out, "TRJ, {t:.4}, {}, {}, {}", p.x, p.y, p.z)?
                        }
                    }
                }
            }
            ArtifactKind::BodyFrame => {
                if let Some((t, _, r)) = history.len().checked_sub(1).and_then(|i| history.sample(i)) {
                    if self.print_type == PrintType::GraphAll {
                        let x_axis: Vector3<f64> = r.column(0).into_owned();
                        writeln!(self.out, "FRM, {t:.4}, {}, {}, {}", x_axis.x, x_axis.y, x_axis.z)?;
                    }
                }
            }
        }
        self.printed.insert(handle, history.len());
        Ok(())
    }
}

impl<W: Write> RenderContext for TerminalContext<W> {
    fn is_available(&self) -> bool {
        true
    }

    fn is_live(&self, handle: ArtifactHandle) -> bool {
        self.printed.contains_key(&handle) && !self.closed.contains(&handle)
    }

    fn create(&mut self, kind: ArtifactKind, history: &HistoryView<'_>) -> Option<ArtifactHandle> {
        let handle = ArtifactHandle(self.next_handle);
        self.next_handle += 1;
        self.write_rows(handle, kind, history).ok()?;
        Some(handle)
    }

    fn update(&mut self, handle: ArtifactHandle, kind: ArtifactKind, history: &HistoryView<'_>) -> bool {
        self.is_live(handle) && self.write_rows(handle, kind, history).is_ok()
    }
}
