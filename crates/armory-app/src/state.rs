// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use crate::Partition;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Session {
    SignedOut,
    SignedIn { user: String },
}

impl Session {
    pub const fn is_signed_in(&self) -> bool {
        matches!(self, Self::SignedIn { .. })
    }

    pub fn user(&self) -> Option<&str> {
        match self {
            Self::SignedIn { user } => Some(user),
            Self::SignedOut => None,
        }
    }
}

/// The three viewer states. Detail selection and image expansion are
/// tracked independently, so closing the image alone lands back in
/// `Detail` rather than `List`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewState {
    List,
    Detail,
    FullImage,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppState {
    pub session: Session,
    pub active_tab: Partition,
    queries: [String; 2],
    detail: Option<String>,
    image_open: bool,
    pub status_line: Option<String>,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            session: Session::SignedOut,
            active_tab: Partition::Active,
            queries: [String::new(), String::new()],
            detail: None,
            image_open: false,
            status_line: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppCommand {
    NextTab,
    PrevTab,
    QueryPush(char),
    QueryPop,
    QueryClear,
    OpenDetail(String),
    CloseDetail,
    OpenImage,
    CloseImage,
    SignIn(String),
    SignOut,
    SetStatus(String),
    ClearStatus,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppEvent {
    TabChanged(Partition),
    QueryChanged { tab: Partition, query: String },
    DetailOpened(String),
    DetailClosed,
    ImageOpened,
    ImageClosed,
    SessionChanged(Session),
    StatusUpdated(String),
    StatusCleared,
}

impl AppState {
    pub fn query(&self, tab: Partition) -> &str {
        &self.queries[tab.index()]
    }

    pub fn detail_key(&self) -> Option<&str> {
        self.detail.as_deref()
    }

    pub const fn view_state(&self) -> ViewState {
        match (&self.detail, self.image_open) {
            (None, _) => ViewState::List,
            (Some(_), false) => ViewState::Detail,
            (Some(_), true) => ViewState::FullImage,
        }
    }

    pub fn dispatch(&mut self, command: AppCommand) -> Vec<AppEvent> {
        match command {
            AppCommand::NextTab => self.rotate_tab(1),
            AppCommand::PrevTab => self.rotate_tab(-1),
            AppCommand::QueryPush(ch) => {
                self.queries[self.active_tab.index()].push(ch);
                vec![self.query_changed()]
            }
            AppCommand::QueryPop => {
                self.queries[self.active_tab.index()].pop();
                vec![self.query_changed()]
            }
            AppCommand::QueryClear => {
                self.queries[self.active_tab.index()].clear();
                vec![self.query_changed()]
            }
            AppCommand::OpenDetail(key) => {
                self.detail = Some(key.clone());
                self.image_open = false;
                vec![AppEvent::DetailOpened(key)]
            }
            AppCommand::CloseDetail => {
                // Closing the detail always drops the image state with it.
                let was_open = self.detail.take().is_some();
                self.image_open = false;
                if was_open {
                    vec![AppEvent::DetailClosed]
                } else {
                    Vec::new()
                }
            }
            AppCommand::OpenImage => {
                if self.detail.is_none() || self.image_open {
                    return Vec::new();
                }
                self.image_open = true;
                vec![AppEvent::ImageOpened]
            }
            AppCommand::CloseImage => {
                if !self.image_open {
                    return Vec::new();
                }
                self.image_open = false;
                vec![AppEvent::ImageClosed]
            }
            AppCommand::SignIn(user) => {
                self.session = Session::SignedIn { user };
                vec![AppEvent::SessionChanged(self.session.clone())]
            }
            AppCommand::SignOut => {
                self.session = Session::SignedOut;
                self.detail = None;
                self.image_open = false;
                self.queries = [String::new(), String::new()];
                self.active_tab = Partition::Active;
                vec![AppEvent::SessionChanged(Session::SignedOut)]
            }
            AppCommand::SetStatus(message) => {
                self.status_line = Some(message.clone());
                vec![AppEvent::StatusUpdated(message)]
            }
            AppCommand::ClearStatus => {
                self.status_line = None;
                vec![AppEvent::StatusCleared]
            }
        }
    }

    fn rotate_tab(&mut self, delta: isize) -> Vec<AppEvent> {
        let tabs = Partition::ALL;
        let current = tabs
            .iter()
            .position(|tab| *tab == self.active_tab)
            .unwrap_or(0) as isize;
        let len = tabs.len() as isize;
        let next = (current + delta).rem_euclid(len) as usize;
        self.active_tab = tabs[next];
        vec![AppEvent::TabChanged(self.active_tab)]
    }

    fn query_changed(&self) -> AppEvent {
        AppEvent::QueryChanged {
            tab: self.active_tab,
            query: self.queries[self.active_tab.index()].clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{AppCommand, AppEvent, AppState, Session, ViewState};
    use crate::Partition;

    #[test]
    fn tab_rotation_wraps() {
        let mut state = AppState::default();

        let events = state.dispatch(AppCommand::NextTab);
        assert_eq!(state.active_tab, Partition::Archived);
        assert_eq!(events, vec![AppEvent::TabChanged(Partition::Archived)]);

        state.dispatch(AppCommand::NextTab);
        assert_eq!(state.active_tab, Partition::Active);
    }

    #[test]
    fn each_tab_owns_its_own_query() {
        let mut state = AppState::default();
        state.dispatch(AppCommand::QueryPush('g'));
        state.dispatch(AppCommand::NextTab);
        state.dispatch(AppCommand::QueryPush('c'));

        assert_eq!(state.query(Partition::Active), "g");
        assert_eq!(state.query(Partition::Archived), "c");

        state.dispatch(AppCommand::QueryClear);
        assert_eq!(state.query(Partition::Archived), "");
        assert_eq!(state.query(Partition::Active), "g");
    }

    #[test]
    fn detail_and_image_transitions() {
        let mut state = AppState::default();
        assert_eq!(state.view_state(), ViewState::List);

        state.dispatch(AppCommand::OpenDetail("Glock-19-ABC123".to_owned()));
        assert_eq!(state.view_state(), ViewState::Detail);
        assert_eq!(state.detail_key(), Some("Glock-19-ABC123"));

        state.dispatch(AppCommand::OpenImage);
        assert_eq!(state.view_state(), ViewState::FullImage);

        state.dispatch(AppCommand::CloseDetail);
        assert_eq!(state.view_state(), ViewState::List);
        assert_eq!(state.detail_key(), None);
    }

    #[test]
    fn closing_the_image_alone_keeps_the_detail_open() {
        let mut state = AppState::default();
        state.dispatch(AppCommand::OpenDetail("Colt-1911-XYZ789".to_owned()));
        state.dispatch(AppCommand::OpenImage);

        let events = state.dispatch(AppCommand::CloseImage);
        assert_eq!(events, vec![AppEvent::ImageClosed]);
        assert_eq!(state.view_state(), ViewState::Detail);
        assert_eq!(state.detail_key(), Some("Colt-1911-XYZ789"));
    }

    #[test]
    fn image_cannot_open_without_a_detail_selection() {
        let mut state = AppState::default();
        let events = state.dispatch(AppCommand::OpenImage);
        assert!(events.is_empty());
        assert_eq!(state.view_state(), ViewState::List);
    }

    #[test]
    fn sign_out_resets_view_state() {
        let mut state = AppState::default();
        state.dispatch(AppCommand::SignIn("alex".to_owned()));
        assert!(state.session.is_signed_in());
        assert_eq!(state.session.user(), Some("alex"));

        state.dispatch(AppCommand::NextTab);
        state.dispatch(AppCommand::QueryPush('r'));
        state.dispatch(AppCommand::OpenDetail("Ruger-10/22-1".to_owned()));

        let events = state.dispatch(AppCommand::SignOut);
        assert_eq!(events, vec![AppEvent::SessionChanged(Session::SignedOut)]);
        assert_eq!(state.view_state(), ViewState::List);
        assert_eq!(state.active_tab, Partition::Active);
        assert_eq!(state.query(Partition::Archived), "");
    }

    #[test]
    fn status_line_set_and_clear() {
        let mut state = AppState::default();
        let events = state.dispatch(AppCommand::SetStatus("loaded 12 records".to_owned()));
        assert_eq!(
            events,
            vec![AppEvent::StatusUpdated("loaded 12 records".to_owned())]
        );
        assert_eq!(state.status_line.as_deref(), Some("loaded 12 records"));

        state.dispatch(AppCommand::ClearStatus);
        assert_eq!(state.status_line, None);
    }
}
