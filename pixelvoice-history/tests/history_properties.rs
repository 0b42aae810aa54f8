//! Property-based tests for the branching edit history.
//!
//! Random operation sequences are run against `EditHistory` and a plain
//! `Vec` + cursor model; after every step both must agree.

use pixelvoice_core::ImageData;
use pixelvoice_history::{EditHistory, HistoryError, ORIGINAL_LABEL};
use proptest::prelude::*;

#[derive(Debug, Clone)]
enum Op {
    Commit(u8),
    Undo,
    Redo,
    Jump(usize),
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        any::<u8>().prop_map(Op::Commit),
        Just(Op::Undo),
        Just(Op::Redo),
        (0usize..12).prop_map(Op::Jump),
    ]
}

fn img(tag: u8) -> ImageData {
    ImageData::new("image/png", vec![tag])
}

/// Build a history by applying `ops`, checking it against the model as we go.
fn run(ops: &[Op]) -> Result<EditHistory, TestCaseError> {
    let mut history = EditHistory::new(img(0));
    let mut model: Vec<u8> = vec![0];
    let mut cursor = 0usize;

    for op in ops {
        match op {
            Op::Commit(tag) => {
                model.truncate(cursor + 1);
                model.push(*tag);
                cursor = model.len() - 1;
                history.commit(img(*tag), format!("edit {}", tag));
            }
            Op::Undo => {
                let moved = history.undo();
                prop_assert_eq!(moved, cursor > 0);
                cursor = cursor.saturating_sub(1);
            }
            Op::Redo => {
                let moved = history.redo();
                prop_assert_eq!(moved, cursor + 1 < model.len());
                if cursor + 1 < model.len() {
                    cursor += 1;
                }
            }
            Op::Jump(index) => {
                let result = history.jump_to(*index);
                if *index < model.len() {
                    prop_assert!(result.is_ok());
                    cursor = *index;
                } else {
                    prop_assert_eq!(
                        result,
                        Err(HistoryError::IndexOutOfRange {
                            index: *index,
                            len: model.len(),
                        })
                    );
                }
            }
        }

        prop_assert_eq!(history.cursor(), cursor);
        prop_assert!(history.cursor() < history.len());
        let images: Vec<u8> = history.entries().iter().map(|e| e.image.bytes[0]).collect();
        prop_assert_eq!(&images, &model);
        prop_assert_eq!(&history.current().id, &history.entries()[cursor].id);
        prop_assert_eq!(history.original().label.as_str(), ORIGINAL_LABEL);
    }

    Ok(history)
}

/// Any sequence of operations keeps history and model in agreement.
#[test]
fn prop_history_matches_model() {
    proptest!(|(ops in prop::collection::vec(op_strategy(), 0..40))| {
        run(&ops)?;
    });
}

/// Commit(H, Y, L): length is H.cursor + 2, cursor is the tail, tail is (Y, L).
#[test]
fn prop_commit_shape() {
    proptest!(|(
        ops in prop::collection::vec(op_strategy(), 0..30),
        tag in any::<u8>(),
        label in "[a-zà-ỹ ]{1,20}",
    )| {
        let mut history = run(&ops)?;
        let before = history.cursor();

        history.commit(img(tag), label.clone());

        prop_assert_eq!(history.len(), before + 2);
        prop_assert_eq!(history.cursor(), history.len() - 1);
        prop_assert_eq!(&history.current().image, &img(tag));
        prop_assert_eq!(&history.current().label, &label);
        prop_assert!(!history.can_redo());
    });
}

/// Redo(Undo(H@i)) == H@i for interior cursors.
#[test]
fn prop_undo_redo_inverse() {
    proptest!(|(
        ops in prop::collection::vec(op_strategy(), 0..30),
        extra in 2usize..6,
        pick in any::<prop::sample::Index>(),
    )| {
        let mut history = run(&ops)?;
        for i in 0..extra {
            history.commit(img(200 + i as u8), "pad");
        }
        // Interior point: 0 < i < len - 1.
        let interior = 1 + pick.index(history.len() - 2);
        history.jump_to(interior).unwrap();
        let before = history.clone();

        prop_assert!(history.undo());
        prop_assert!(history.redo());
        prop_assert_eq!(history, before);
    });
}

/// Undo at the original and redo at the tail change nothing.
#[test]
fn prop_edges_are_noops() {
    proptest!(|(ops in prop::collection::vec(op_strategy(), 0..30))| {
        let mut history = run(&ops)?;

        history.jump_to(0).unwrap();
        let at_start = history.clone();
        prop_assert!(!history.undo());
        prop_assert_eq!(&history, &at_start);

        let last = history.len() - 1;
        history.jump_to(last).unwrap();
        let at_end = history.clone();
        prop_assert!(!history.redo());
        prop_assert_eq!(&history, &at_end);
    });
}
