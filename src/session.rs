// src/session.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ConversationState {
    #[default]
    Initiate,
    TakingOrder,
    TakingUserDetails,
    EndConversation,
}

impl ConversationState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, ConversationState::EndConversation)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderDraft {
    pub coffee_items: Vec<String>,
    pub dessert_items: Vec<String>,
    pub user_name: Option<String>,
    pub user_address: Option<String>,
    pub user_notes: Option<String>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl OrderDraft {
    pub fn has_items(&self) -> bool {
        !self.coffee_items.is_empty() || !self.dessert_items.is_empty()
    }

    pub fn has_all_details(&self) -> bool {
        self.user_name.is_some() && self.user_address.is_some() && self.user_notes.is_some()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Unchanged,
    Moved {
        from: ConversationState,
        to: ConversationState,
    },
}

impl Transition {
    pub fn entered(&self, state: ConversationState) -> bool {
        matches!(self, Transition::Moved { to, .. } if *to == state)
    }
}

// State only changes through the transition methods, which the dialogue
// engine calls on behalf of intent handlers.
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    id: Uuid,
    state: ConversationState,
    draft: OrderDraft,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            state: ConversationState::Initiate,
            draft: OrderDraft::default(),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn state(&self) -> ConversationState {
        self.state
    }

    pub fn draft(&self) -> &OrderDraft {
        &self.draft
    }

    pub fn is_finished(&self) -> bool {
        self.state.is_terminal()
    }

    pub(crate) fn draft_mut(&mut self) -> &mut OrderDraft {
        &mut self.draft
    }

    pub(crate) fn begin_order(&mut self) -> Transition {
        match self.state {
            ConversationState::TakingOrder | ConversationState::EndConversation => {
                Transition::Unchanged
            }
            _ => self.move_to(ConversationState::TakingOrder),
        }
    }

    // "No more items". A no-op before ordering starts and after it ends.
    pub(crate) fn close(&mut self) -> Transition {
        match self.state {
            ConversationState::TakingOrder => self.move_to(ConversationState::TakingUserDetails),
            ConversationState::TakingUserDetails => self.finish(),
            ConversationState::Initiate | ConversationState::EndConversation => {
                Transition::Unchanged
            }
        }
    }

    pub(crate) fn enter_user_details(&mut self) -> Transition {
        match self.state {
            ConversationState::TakingUserDetails | ConversationState::EndConversation => {
                Transition::Unchanged
            }
            _ => self.move_to(ConversationState::TakingUserDetails),
        }
    }

    pub(crate) fn complete_if_ready(&mut self) -> Transition {
        if self.state == ConversationState::TakingUserDetails
            && self.draft.has_items()
            && self.draft.has_all_details()
        {
            self.finish()
        } else {
            Transition::Unchanged
        }
    }

    fn finish(&mut self) -> Transition {
        self.draft.completed_at = Some(Utc::now());
        self.move_to(ConversationState::EndConversation)
    }

    fn move_to(&mut self, to: ConversationState) -> Transition {
        let from = self.state;
        self.state = to;
        debug!("Session {} moved {:?} -> {:?}", self.id, from, to);
        Transition::Moved { from, to }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn follows_the_ordering_flow() {
        let mut session = Session::new();
        assert_eq!(session.state(), ConversationState::Initiate);

        assert!(session.begin_order().entered(ConversationState::TakingOrder));
        assert_eq!(session.begin_order(), Transition::Unchanged);

        assert!(session.close().entered(ConversationState::TakingUserDetails));
        assert!(session.close().entered(ConversationState::EndConversation));
        assert!(session.draft().completed_at.is_some());

        assert_eq!(session.close(), Transition::Unchanged);
        assert_eq!(session.state(), ConversationState::EndConversation);
    }

    #[test]
    fn closing_before_ordering_is_a_no_op() {
        let mut session = Session::new();
        assert_eq!(session.close(), Transition::Unchanged);
        assert_eq!(session.state(), ConversationState::Initiate);
    }

    #[test]
    fn detail_capture_skips_ahead() {
        let mut session = Session::new();
        assert_eq!(
            session.enter_user_details(),
            Transition::Moved {
                from: ConversationState::Initiate,
                to: ConversationState::TakingUserDetails,
            }
        );

        // ordering again from the details stage goes back to taking orders
        assert!(session.begin_order().entered(ConversationState::TakingOrder));
        assert!(session.enter_user_details().entered(ConversationState::TakingUserDetails));
    }

    #[test]
    fn nothing_leaves_the_terminal_state() {
        let mut session = Session::new();
        session.begin_order();
        session.close();
        session.close();

        assert_eq!(session.begin_order(), Transition::Unchanged);
        assert_eq!(session.enter_user_details(), Transition::Unchanged);
        assert_eq!(session.complete_if_ready(), Transition::Unchanged);
        assert!(session.is_finished());
    }

    #[test]
    fn completes_once_all_details_are_known() {
        let mut session = Session::new();
        session.begin_order();
        session.draft_mut().coffee_items.push("latte".to_string());
        session.enter_user_details();
        session.draft_mut().user_name = Some("Alex".to_string());
        session.draft_mut().user_address = Some("5 Main St".to_string());
        assert_eq!(session.complete_if_ready(), Transition::Unchanged);

        session.draft_mut().user_notes = Some("no sugar".to_string());
        assert!(session.complete_if_ready().entered(ConversationState::EndConversation));
    }

    #[test]
    fn details_alone_do_not_complete_an_empty_order() {
        let mut session = Session::new();
        session.enter_user_details();
        session.draft_mut().user_name = Some("Alex".to_string());
        session.draft_mut().user_address = Some("5 Main St".to_string());
        session.draft_mut().user_notes = Some("no sugar".to_string());

        assert_eq!(session.complete_if_ready(), Transition::Unchanged);
        assert_eq!(session.state(), ConversationState::TakingUserDetails);
        assert!(session.draft().completed_at.is_none());
    }
}
