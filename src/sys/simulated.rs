//! In-memory implementation of [`DesktopOps`].
//!
//! Backs the test suite and the `simulate` subcommand. Failures can be
//! scripted: [`SimulatedDesktops::fail_next`] makes the next n backend
//! calls fail with a stale-handle error, which is how the recovery path is
//! exercised without a live desktop manager.

use parking_lot::Mutex;

use crate::sys::desktop::{DesktopId, DesktopOps, NativeError, WindowId, WindowInfo};

struct SimWindow {
    info: WindowInfo,
    desktop: DesktopId,
}

struct State {
    desktops: Vec<DesktopId>,
    /// 0-based index into `desktops`.
    current: usize,
    windows: Vec<SimWindow>,
    focused: Option<WindowId>,
    next_desktop_id: u64,
    next_window_id: u64,
    pending_stale: usize,
    reinit_count: usize,
    switch_count: usize,
}

impl State {
    fn take_fault(&mut self) -> Result<(), NativeError> {
        if self.pending_stale > 0 {
            self.pending_stale -= 1;
            return Err(NativeError::Stale("scripted stale handle".into()));
        }
        Ok(())
    }
}

pub struct SimulatedDesktops {
    state: Mutex<State>,
}

impl SimulatedDesktops {
    pub fn with_desktops(count: usize) -> SimulatedDesktops {
        let count = count.max(1);
        SimulatedDesktops {
            state: Mutex::new(State {
                desktops: (1..=count as u64).map(DesktopId::new).collect(),
                current: 0,
                windows: Vec::new(),
                focused: None,
                next_desktop_id: count as u64 + 1,
                next_window_id: 1,
                pending_stale: 0,
                reinit_count: 0,
                switch_count: 0,
            }),
        }
    }

    /// Appends a desktop at the end of the sequence.
    pub fn add_desktop(&self) -> DesktopId {
        let mut st = self.state.lock();
        let id = DesktopId::new(st.next_desktop_id);
        st.next_desktop_id += 1;
        st.desktops.push(id);
        id
    }

    /// Removes a desktop; its windows relocate to the nearest remaining
    /// neighbor. Refuses to remove the last desktop.
    pub fn remove_desktop(&self, id: DesktopId) -> bool {
        let mut st = self.state.lock();
        let Some(pos) = st.desktops.iter().position(|d| *d == id) else {
            return false;
        };
        if st.desktops.len() == 1 {
            return false;
        }
        st.desktops.remove(pos);
        let fallback = st.desktops[pos.saturating_sub(1)];
        for window in &mut st.windows {
            if window.desktop == id {
                window.desktop = fallback;
            }
        }
        if st.current >= st.desktops.len() {
            st.current = st.desktops.len() - 1;
        } else if st.current > pos {
            st.current -= 1;
        }
        true
    }

    /// Opens a window on the visible desktop and focuses it.
    pub fn open_window(&self, pid: i32, title: &str) -> WindowId {
        let mut st = self.state.lock();
        let id = WindowId::new(st.next_window_id);
        st.next_window_id += 1;
        let desktop = st.desktops[st.current];
        st.windows.push(SimWindow {
            info: WindowInfo { id, pid, title: title.into() },
            desktop,
        });
        st.focused = Some(id);
        id
    }

    pub fn focus(&self, window: WindowId) {
        self.state.lock().focused = Some(window);
    }

    pub fn desktop_of(&self, window: WindowId) -> Option<DesktopId> {
        let st = self.state.lock();
        st.windows.iter().find(|w| w.info.id == window).map(|w| w.desktop)
    }

    /// 1-based index of the visible desktop, bypassing fault injection.
    pub fn current_index(&self) -> usize {
        self.state.lock().current + 1
    }

    /// Desktop identities in order, bypassing fault injection.
    pub fn ids(&self) -> Vec<DesktopId> {
        self.state.lock().desktops.clone()
    }

    /// The next `n` backend calls fail with a stale-handle error.
    pub fn fail_next(&self, n: usize) {
        self.state.lock().pending_stale = n;
    }

    pub fn reinit_count(&self) -> usize {
        self.state.lock().reinit_count
    }

    pub fn switch_count(&self) -> usize {
        self.state.lock().switch_count
    }
}

impl DesktopOps for SimulatedDesktops {
    fn desktops(&self) -> Result<Vec<DesktopId>, NativeError> {
        let mut st = self.state.lock();
        st.take_fault()?;
        Ok(st.desktops.clone())
    }

    fn current_desktop(&self) -> Result<usize, NativeError> {
        let mut st = self.state.lock();
        st.take_fault()?;
        Ok(st.current + 1)
    }

    fn switch_to(&self, desktop: DesktopId) -> Result<(), NativeError> {
        let mut st = self.state.lock();
        st.take_fault()?;
        let Some(pos) = st.desktops.iter().position(|d| *d == desktop) else {
            return Err(NativeError::Backend(format!("unknown desktop {desktop}")));
        };
        st.current = pos;
        st.switch_count += 1;
        Ok(())
    }

    fn focused_window(&self) -> Result<WindowInfo, NativeError> {
        let mut st = self.state.lock();
        st.take_fault()?;
        let focused = st.focused.ok_or_else(|| NativeError::Backend("no focused window".into()))?;
        st.windows
            .iter()
            .find(|w| w.info.id == focused)
            .map(|w| w.info.clone())
            .ok_or_else(|| NativeError::Backend("focused window vanished".into()))
    }

    fn windows_of(&self, pid: i32) -> Result<Vec<WindowInfo>, NativeError> {
        let mut st = self.state.lock();
        st.take_fault()?;
        Ok(st.windows.iter().filter(|w| w.info.pid == pid).map(|w| w.info.clone()).collect())
    }

    fn move_window(&self, window: WindowId, desktop: DesktopId) -> Result<(), NativeError> {
        let mut st = self.state.lock();
        st.take_fault()?;
        if !st.desktops.contains(&desktop) {
            return Err(NativeError::Backend(format!("unknown desktop {desktop}")));
        }
        let Some(entry) = st.windows.iter_mut().find(|w| w.info.id == window) else {
            return Err(NativeError::Backend(format!("unknown window {:#x}", window.get())));
        };
        entry.desktop = desktop;
        Ok(())
    }

    fn reinitialize(&self) -> Result<(), NativeError> {
        self.state.lock().reinit_count += 1;
        Ok(())
    }
}
