use crate::core::error::{InvalidStateError, ValidationError};
use crate::core::message::{EntryId, EntryStatus, MessageEntry, TranscriptRole};
use tracing::debug;

/// One completed question/answer pair from the visible conversation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletedTurn {
    pub question: String,
    pub answer: String,
}

/// Ordered, append-only record of the conversation.
///
/// Entries are never removed or reordered. Only a `Pending` assistant entry
/// changes after it is appended, and only once, to `Complete` or `Failed`.
#[derive(Debug, Default)]
pub struct ChatTranscript {
    entries: Vec<MessageEntry>,
    next_id: u64,
    pending: Option<EntryId>,
}

impl ChatTranscript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append_user(&mut self, text: &str) -> Result<EntryId, ValidationError> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::EmptyInput);
        }
        let id = self.allocate_id();
        self.entries.push(MessageEntry::user(id, trimmed));
        debug!(entry = %id, "appended user entry");
        Ok(id)
    }

    pub fn append_pending_assistant(&mut self) -> Result<EntryId, InvalidStateError> {
        if let Some(id) = self.pending {
            return Err(InvalidStateError::PendingOutstanding { id });
        }
        let id = self.allocate_id();
        self.entries.push(MessageEntry::pending_assistant(id));
        self.pending = Some(id);
        debug!(entry = %id, "appended pending assistant entry");
        Ok(id)
    }

    pub fn resolve(
        &mut self,
        id: EntryId,
        content: impl Into<String>,
    ) -> Result<(), InvalidStateError> {
        self.resolve_with_sources(id, content, Vec::new())
    }

    pub fn resolve_with_sources(
        &mut self,
        id: EntryId,
        content: impl Into<String>,
        sources: Vec<String>,
    ) -> Result<(), InvalidStateError> {
        let entry = self.pending_entry_mut(id)?;
        entry.content = content.into();
        entry.sources = sources;
        entry.status = EntryStatus::Complete;
        self.pending = None;
        debug!(entry = %id, "resolved assistant entry");
        Ok(())
    }

    pub fn fail(&mut self, id: EntryId, message: impl Into<String>) -> Result<(), InvalidStateError> {
        let entry = self.pending_entry_mut(id)?;
        entry.content = message.into();
        entry.status = EntryStatus::Failed;
        self.pending = None;
        debug!(entry = %id, "failed assistant entry");
        Ok(())
    }

    pub fn entries(&self) -> &[MessageEntry] {
        &self.entries
    }

    pub fn get(&self, id: EntryId) -> Option<&MessageEntry> {
        // Ids are dense and allocated in push order.
        self.entries
            .get(id.0 as usize)
            .filter(|entry| entry.id == id)
    }

    pub fn pending(&self) -> Option<EntryId> {
        self.pending
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The most recent completed question/answer pairs, oldest first.
    ///
    /// A user entry counts only when the entry right after it is a completed
    /// answer; failed and in-flight turns are skipped.
    pub fn completed_turns(&self, limit: usize) -> Vec<CompletedTurn> {
        let mut turns: Vec<CompletedTurn> = self
            .entries
            .windows(2)
            .filter_map(|pair| {
                let (question, answer) = (&pair[0], &pair[1]);
                let answered = question.role == TranscriptRole::User
                    && answer.role == TranscriptRole::Assistant
                    && answer.status == EntryStatus::Complete;
                answered.then(|| CompletedTurn {
                    question: question.content.clone(),
                    answer: answer.content.clone(),
                })
            })
            .collect();
        let skip = turns.len().saturating_sub(limit);
        turns.drain(..skip);
        turns
    }

    fn allocate_id(&mut self) -> EntryId {
        let id = EntryId(self.next_id);
        self.next_id += 1;
        id
    }

    fn pending_entry_mut(&mut self, id: EntryId) -> Result<&mut MessageEntry, InvalidStateError> {
        let entry = self
            .entries
            .get_mut(id.0 as usize)
            .filter(|entry| entry.id == id)
            .ok_or(InvalidStateError::UnknownEntry { id })?;
        if entry.status != EntryStatus::Pending {
            return Err(InvalidStateError::NotPending { id });
        }
        Ok(entry)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn statuses(transcript: &ChatTranscript) -> Vec<(TranscriptRole, EntryStatus)> {
        transcript
            .entries()
            .iter()
            .map(|entry| (entry.role, entry.status))
            .collect()
    }

    #[test]
    fn append_user_trims_and_rejects_blank_text() {
        let mut transcript = ChatTranscript::new();
        assert_eq!(transcript.append_user(""), Err(ValidationError::EmptyInput));
        assert_eq!(
            transcript.append_user(" \t\n "),
            Err(ValidationError::EmptyInput)
        );
        assert!(transcript.is_empty());

        let id = transcript.append_user("  What is 2+2?  ").expect("append");
        let entry = transcript.get(id).expect("entry");
        assert_eq!(entry.content, "What is 2+2?");
        assert_eq!(entry.status, EntryStatus::Complete);
        assert!(entry.is_user());
    }

    #[test]
    fn only_one_pending_assistant_at_a_time() {
        let mut transcript = ChatTranscript::new();
        transcript.append_user("hello").expect("append");
        let pending = transcript.append_pending_assistant().expect("pending");

        assert_eq!(
            transcript.append_pending_assistant(),
            Err(InvalidStateError::PendingOutstanding { id: pending })
        );
        assert_eq!(transcript.len(), 2);

        transcript.resolve(pending, "hi").expect("resolve");
        assert!(transcript.pending().is_none());
        transcript
            .append_pending_assistant()
            .expect("a new placeholder is allowed once the first settles");
    }

    #[test]
    fn resolve_and_fail_replace_in_place() {
        let mut transcript = ChatTranscript::new();
        transcript.append_user("q1").expect("append");
        let first = transcript.append_pending_assistant().expect("pending");
        transcript
            .resolve_with_sources(first, "a1", vec!["Lesson 1".into()])
            .expect("resolve");
        transcript.append_user("q2").expect("append");
        let second = transcript.append_pending_assistant().expect("pending");
        transcript.fail(second, "network down").expect("fail");

        assert_eq!(
            statuses(&transcript),
            vec![
                (TranscriptRole::User, EntryStatus::Complete),
                (TranscriptRole::Assistant, EntryStatus::Complete),
                (TranscriptRole::User, EntryStatus::Complete),
                (TranscriptRole::Assistant, EntryStatus::Failed),
            ]
        );
        let resolved = transcript.get(first).expect("entry");
        assert_eq!(resolved.content, "a1");
        assert_eq!(resolved.sources, vec!["Lesson 1".to_string()]);
        assert_eq!(transcript.get(second).expect("entry").content, "network down");
    }

    #[test]
    fn terminal_entries_cannot_be_settled_again() {
        let mut transcript = ChatTranscript::new();
        let user = transcript.append_user("q").expect("append");
        let pending = transcript.append_pending_assistant().expect("pending");
        transcript.resolve(pending, "a").expect("resolve");

        assert_eq!(
            transcript.resolve(pending, "again"),
            Err(InvalidStateError::NotPending { id: pending })
        );
        assert_eq!(
            transcript.fail(pending, "late failure"),
            Err(InvalidStateError::NotPending { id: pending })
        );
        assert_eq!(
            transcript.resolve(user, "not an answer"),
            Err(InvalidStateError::NotPending { id: user })
        );
        assert_eq!(transcript.get(pending).expect("entry").content, "a");
    }

    #[test]
    fn unknown_ids_are_rejected() {
        let mut transcript = ChatTranscript::new();
        let ghost = EntryId(42);
        assert_eq!(
            transcript.resolve(ghost, "x"),
            Err(InvalidStateError::UnknownEntry { id: ghost })
        );
        assert_eq!(
            transcript.fail(ghost, "x"),
            Err(InvalidStateError::UnknownEntry { id: ghost })
        );
        assert!(transcript.get(ghost).is_none());
    }

    #[test]
    fn ids_follow_append_order() {
        let mut transcript = ChatTranscript::new();
        let a = transcript.append_user("a").expect("append");
        let b = transcript.append_pending_assistant().expect("pending");
        let c = transcript.append_user("c").expect("append");
        assert!(a < b && b < c);
        let ids: Vec<_> = transcript.entries().iter().map(|entry| entry.id).collect();
        assert_eq!(ids, vec![a, b, c]);
    }

    #[test]
    fn completed_turns_skip_failed_and_pending_answers() {
        let mut transcript = ChatTranscript::new();
        for (question, outcome) in [("q1", Some("a1")), ("q2", None), ("q3", Some("a3"))] {
            transcript.append_user(question).expect("append");
            let pending = transcript.append_pending_assistant().expect("pending");
            match outcome {
                Some(answer) => transcript.resolve(pending, answer).expect("resolve"),
                None => transcript.fail(pending, "boom").expect("fail"),
            }
        }
        transcript.append_user("q4").expect("append");
        transcript.append_pending_assistant().expect("pending");

        let turns = transcript.completed_turns(10);
        assert_eq!(
            turns,
            vec![
                CompletedTurn {
                    question: "q1".into(),
                    answer: "a1".into()
                },
                CompletedTurn {
                    question: "q3".into(),
                    answer: "a3".into()
                },
            ]
        );

        let latest = transcript.completed_turns(1);
        assert_eq!(latest.len(), 1);
        assert_eq!(latest[0].question, "q3");
        assert!(transcript.completed_turns(0).is_empty());
    }
}
