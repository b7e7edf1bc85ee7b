//! Property tests for transcript persistence.
//!
//! The remote service may return a thread's messages in any order; the
//! persisted transcript must not depend on it.

use proptest::prelude::*;
use tempfile::TempDir;

use sql_assistant::adapters::FileResultSink;
use sql_assistant::domain::assistant::{Message, Role, Transcript};
use sql_assistant::domain::foundation::Timestamp;
use sql_assistant::ports::ResultSink;

fn message() -> impl Strategy<Value = Message> {
    // Narrow ranges so timestamp ties and duplicate texts are common.
    (any::<bool>(), "[a-c]{0,3}", 0i64..5).prop_map(|(from_user, text, secs)| {
        let sender = if from_user { Role::User } else { Role::Assistant };
        Message::new(sender, text, Timestamp::from_unix_secs(1_700_000_000 + secs))
    })
}

fn message_and_permutation() -> impl Strategy<Value = (Vec<Message>, Vec<Message>)> {
    prop::collection::vec(message(), 0..12)
        .prop_flat_map(|messages| (Just(messages.clone()), Just(messages).prop_shuffle()))
}

fn persisted(messages: Vec<Message>) -> Vec<u8> {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("sql-analyst-chat.json");
    let runtime = tokio::runtime::Builder::new_current_thread()
        .build()
        .unwrap();
    runtime
        .block_on(FileResultSink::new().write_transcript(&path, &Transcript::new(messages)))
        .unwrap();
    std::fs::read(&path).unwrap()
}

proptest! {
    #[test]
    fn permuted_transcripts_persist_identically((original, shuffled) in message_and_permutation()) {
        prop_assert_eq!(persisted(original), persisted(shuffled));
    }

    #[test]
    fn sorted_entries_are_in_timestamp_order((messages, _) in message_and_permutation()) {
        let entries = Transcript::new(messages).sorted_entries();
        prop_assert!(entries.windows(2).all(|w| w[0].timestamp <= w[1].timestamp));
    }

    #[test]
    fn recipient_is_always_the_other_party((messages, _) in message_and_permutation()) {
        for entry in Transcript::new(messages).sorted_entries() {
            prop_assert_ne!(entry.sender, entry.recipient);
        }
    }
}
