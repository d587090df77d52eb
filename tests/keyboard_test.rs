use crossterm::event::{KeyCode, KeyModifiers};
use utmgrid::row::{CellCoord, Field, Row};
use utmgrid::toast::ToastKind;
use utmgrid::Focus;

mod common;
use common::{builder_with, press, sample_row};

const NONE: KeyModifiers = KeyModifiers::NONE;
const SHIFT: KeyModifiers = KeyModifiers::SHIFT;
const CTRL: KeyModifiers = KeyModifiers::CONTROL;

#[test]
fn test_escape_walks_from_editing_to_row_and_back() {
    let (mut b, _) = builder_with(vec![sample_row(0), sample_row(1)]);
    assert_eq!(b.focus(), Focus::Idle);

    press(&mut b, KeyCode::Enter, NONE);
    assert_eq!(b.focus(), Focus::Editing(CellCoord::new(0, Field::BaseUrl)));

    press(&mut b, KeyCode::Tab, NONE);
    let cell = CellCoord::new(0, Field::Source);
    assert_eq!(b.focus(), Focus::Editing(cell));

    press(&mut b, KeyCode::Esc, NONE);
    assert_eq!(b.focus(), Focus::CellSelected(cell));
    press(&mut b, KeyCode::Esc, NONE);
    assert_eq!(b.focus(), Focus::RowSelected(0));
    press(&mut b, KeyCode::Esc, NONE);
    assert_eq!(b.focus(), Focus::Editing(cell));
}

#[test]
fn test_cell_range_copy_then_paste_elsewhere() {
    let rows = (0..4).map(sample_row).collect();
    let (mut b, clipboard) = builder_with(rows);
    b.focus_cell(0, Field::Source);

    press(&mut b, KeyCode::Down, SHIFT);
    press(&mut b, KeyCode::Right, SHIFT);
    assert_eq!(
        b.focus(),
        Focus::CellRange {
            anchor: CellCoord::new(0, Field::Source),
            head: CellCoord::new(1, Field::Medium),
        }
    );

    press(&mut b, KeyCode::Char('c'), CTRL);
    assert_eq!(clipboard.text().as_deref(), Some("s0\tm0\ns1\tm1"));

    press(&mut b, KeyCode::Esc, NONE);
    assert_eq!(b.focus(), Focus::CellSelected(CellCoord::new(1, Field::Medium)));
    press(&mut b, KeyCode::Down, NONE);
    press(&mut b, KeyCode::Left, NONE);
    assert_eq!(b.focus(), Focus::CellSelected(CellCoord::new(2, Field::Source)));

    press(&mut b, KeyCode::Char('v'), CTRL);
    let rows = b.rows();
    assert_eq!((rows[2].source.as_str(), rows[2].medium.as_str()), ("s0", "m0"));
    assert_eq!((rows[3].source.as_str(), rows[3].medium.as_str()), ("s1", "m1"));
    assert_eq!(rows[2].campaign, "c2");
}

#[test]
fn test_cell_paste_drops_values_past_the_grid() {
    let (mut b, clipboard) = builder_with(vec![sample_row(0)]);
    *clipboard.0.borrow_mut() = Some(" a \tb\tc\n\nx\ty".to_string());
    b.focus_cell(0, Field::Term);
    press(&mut b, KeyCode::Esc, NONE);
    press(&mut b, KeyCode::Char('v'), CTRL);

    assert_eq!(b.rows().len(), 1);
    assert_eq!(b.rows()[0].term, "a");
    assert_eq!(b.rows()[0].content, "b");
}

#[test]
fn test_row_copy_paste_inserts_fresh_copy() {
    let (mut b, _) = builder_with(vec![sample_row(0), sample_row(1)]);
    b.focus_cell(0, Field::Source);
    press(&mut b, KeyCode::Esc, NONE);
    press(&mut b, KeyCode::Esc, NONE);
    assert_eq!(b.focus(), Focus::RowSelected(0));

    press(&mut b, KeyCode::Char('c'), CTRL);
    press(&mut b, KeyCode::Char('v'), CTRL);

    let rows = b.rows();
    assert_eq!(rows.len(), 3);
    assert_eq!(rows[1].source, "s0");
    assert_ne!(rows[1].id, rows[0].id);
    assert_eq!(rows[2].source, "s1");
    assert_eq!(b.focus(), Focus::RowSelected(1));
}

#[test]
fn test_row_paste_without_copy_warns() {
    let (mut b, _) = builder_with(vec![sample_row(0)]);
    b.focus_cell(0, Field::Source);
    press(&mut b, KeyCode::Esc, NONE);
    press(&mut b, KeyCode::Esc, NONE);
    press(&mut b, KeyCode::Char('v'), CTRL);

    assert_eq!(b.rows().len(), 1);
    assert_eq!(b.toasts().current().map(|t| t.kind), Some(ToastKind::Warning));
}

#[test]
fn test_deleting_the_only_row_is_refused() {
    let (mut b, _) = builder_with(vec![sample_row(0)]);
    b.focus_cell(0, Field::BaseUrl);
    press(&mut b, KeyCode::Esc, NONE);
    press(&mut b, KeyCode::Esc, NONE);
    press(&mut b, KeyCode::Delete, NONE);

    assert_eq!(b.rows().len(), 1);
    assert_eq!(b.toasts().current().map(|t| t.kind), Some(ToastKind::Warning));
    assert!(!b.history().can_undo());
}

#[test]
fn test_row_range_delete_selects_row_above() {
    let rows = (0..3).map(sample_row).collect();
    let (mut b, _) = builder_with(rows);
    b.focus_cell(1, Field::BaseUrl);
    press(&mut b, KeyCode::Esc, NONE);
    press(&mut b, KeyCode::Esc, NONE);
    press(&mut b, KeyCode::Down, SHIFT);
    assert_eq!(b.focus(), Focus::RowRange { anchor: 1, head: 2 });

    press(&mut b, KeyCode::Backspace, NONE);
    assert_eq!(b.rows().len(), 1);
    assert_eq!(b.rows()[0].source, "s0");
    assert_eq!(b.focus(), Focus::RowSelected(0));
}

#[test]
fn test_space_toggles_a_row_range_uniformly() {
    let mut checked = sample_row(1);
    checked.selected = true;
    let (mut b, _) = builder_with(vec![sample_row(0), checked]);
    b.focus_cell(0, Field::BaseUrl);
    press(&mut b, KeyCode::Esc, NONE);
    press(&mut b, KeyCode::Esc, NONE);
    press(&mut b, KeyCode::Down, SHIFT);

    press(&mut b, KeyCode::Char(' '), NONE);
    assert!(b.rows().iter().all(|r| r.selected));
    press(&mut b, KeyCode::Char(' '), NONE);
    assert!(b.rows().iter().all(|r| !r.selected));
}

#[test]
fn test_undo_redo_restore_text_and_caret_cell() {
    let (mut b, _) = builder_with(vec![Row::new_empty()]);
    let cell = CellCoord::new(0, Field::BaseUrl);
    press(&mut b, KeyCode::Enter, NONE);
    press(&mut b, KeyCode::Char('a'), NONE);
    press(&mut b, KeyCode::Char('b'), NONE);
    assert_eq!(b.rows()[0].base_url, "ab");

    assert!(b.undo());
    b.settle();
    assert_eq!(b.rows()[0].base_url, "a");
    assert_eq!(b.focus(), Focus::Editing(cell));
    assert_eq!(b.editor().value(), "a");

    assert!(b.undo());
    b.settle();
    assert_eq!(b.rows()[0].base_url, "");
    assert!(!b.undo());
    b.settle();

    assert!(b.redo());
    b.settle();
    assert_eq!(b.rows()[0].base_url, "a");
    assert_eq!(b.focus(), Focus::Editing(cell));
}

#[test]
fn test_history_keeps_fifty_steps() {
    let (mut b, _) = builder_with(vec![Row::new_empty()]);
    for _ in 0..60 {
        b.add_row();
        b.settle();
    }
    assert_eq!(b.rows().len(), 61);
    assert_eq!(b.history().past_len(), 50);

    let mut undone = 0;
    while b.undo() {
        b.settle();
        undone += 1;
    }
    assert_eq!(undone, 50);
    assert_eq!(b.rows().len(), 11);
}

#[test]
fn test_enter_on_last_row_appends_a_row() {
    let (mut b, _) = builder_with(vec![Row::new_empty()]);
    press(&mut b, KeyCode::Enter, NONE);
    press(&mut b, KeyCode::Enter, NONE);
    assert_eq!(b.rows().len(), 2);
    assert_eq!(b.focus(), Focus::Editing(CellCoord::new(1, Field::BaseUrl)));
}

#[test]
fn test_typing_on_a_selected_cell_replaces_its_value() {
    let (mut b, _) = builder_with(vec![sample_row(0)]);
    b.focus_cell(0, Field::Source);
    press(&mut b, KeyCode::Esc, NONE);
    press(&mut b, KeyCode::Char('x'), NONE);

    let cell = CellCoord::new(0, Field::Source);
    assert_eq!(b.focus(), Focus::Editing(cell));
    assert_eq!(b.rows()[0].source, "x");
    press(&mut b, KeyCode::Char('y'), NONE);
    assert_eq!(b.rows()[0].source, "xy");
}

#[test]
fn test_shift_left_inside_text_selects_text() {
    let (mut b, _) = builder_with(vec![sample_row(0)]);
    b.focus_cell(0, Field::Source);
    press(&mut b, KeyCode::Left, SHIFT);
    assert_eq!(b.focus(), Focus::Editing(CellCoord::new(0, Field::Source)));
    assert!(b.editor().has_selection());

    // Caret at the start of an empty cell: Shift+Left leaves the editor
    let (mut b, _) = builder_with(vec![Row::new_empty()]);
    b.focus_cell(0, Field::Source);
    press(&mut b, KeyCode::Left, SHIFT);
    assert_eq!(
        b.focus(),
        Focus::CellRange {
            anchor: CellCoord::new(0, Field::Source),
            head: CellCoord::new(0, Field::BaseUrl),
        }
    );
}

#[test]
fn test_cell_arrows_stop_at_grid_edges() {
    let (mut b, _) = builder_with(vec![sample_row(0)]);
    b.focus_cell(0, Field::BaseUrl);
    press(&mut b, KeyCode::Esc, NONE);
    press(&mut b, KeyCode::Up, NONE);
    press(&mut b, KeyCode::Left, NONE);
    assert_eq!(b.focus(), Focus::CellSelected(CellCoord::new(0, Field::BaseUrl)));
}

#[test]
fn test_delete_while_editing_undoes_in_one_step() {
    let mut keep = Row::new_empty();
    keep.base_url = "keep.com".to_string();
    let (mut b, _) = builder_with(vec![keep, Row::new_empty()]);
    let cell = CellCoord::new(1, Field::BaseUrl);
    b.focus_cell(1, Field::BaseUrl);
    for c in "x.i".chars() {
        press(&mut b, KeyCode::Char(c), NONE);
    }

    let before = b.history().past_len();
    b.delete_focused_row();
    b.settle();
    assert_eq!(b.rows().len(), 1);
    assert_eq!(b.history().past_len(), before + 1);
    assert_eq!(b.focus(), Focus::Editing(CellCoord::new(0, Field::BaseUrl)));
    assert_eq!(b.editor().value(), "keep.com");

    assert!(b.undo());
    b.settle();
    assert_eq!(b.rows().len(), 2);
    assert_eq!(b.rows()[1].base_url, "x.i");
    assert_eq!(b.focus(), Focus::Editing(cell));
    assert_eq!(b.editor().value(), "x.i");
}

#[test]
fn test_enter_on_last_row_is_one_undo_step() {
    let (mut b, _) = builder_with(vec![Row::new_empty()]);
    b.focus_cell(0, Field::BaseUrl);
    for c in "a.com".chars() {
        press(&mut b, KeyCode::Char(c), NONE);
    }

    let before = b.history().past_len();
    press(&mut b, KeyCode::Enter, NONE);
    assert_eq!(b.history().past_len(), before + 1);
    assert_eq!(b.rows().len(), 2);
    assert_eq!(b.rows()[0].base_url, "https://a.com");

    assert!(b.undo());
    b.settle();
    assert_eq!(b.rows().len(), 1);
    assert_eq!(b.focus(), Focus::Editing(CellCoord::new(0, Field::BaseUrl)));
}

#[test]
fn test_editing_arrows_leave_the_cell_only_at_the_text_edge() {
    let (mut b, _) = builder_with(vec![sample_row(0)]);
    let source = CellCoord::new(0, Field::Source);
    b.focus_cell(0, Field::Source);

    // Caret starts after "s0"
    press(&mut b, KeyCode::Right, NONE);
    assert_eq!(b.focus(), Focus::Editing(CellCoord::new(0, Field::Medium)));
    press(&mut b, KeyCode::BackTab, NONE);
    assert_eq!(b.focus(), Focus::Editing(source));

    press(&mut b, KeyCode::Left, NONE);
    assert_eq!(b.focus(), Focus::Editing(source));
    assert_eq!(b.editor().cursor(), 1);
    press(&mut b, KeyCode::Left, NONE);
    assert_eq!(b.focus(), Focus::Editing(source));
    press(&mut b, KeyCode::Left, NONE);
    assert_eq!(b.focus(), Focus::Editing(CellCoord::new(0, Field::BaseUrl)));
}

#[test]
fn test_editing_copy_takes_text_selection_or_whole_row() {
    let (mut b, clipboard) = builder_with(vec![sample_row(0)]);
    b.focus_cell(0, Field::Source);
    press(&mut b, KeyCode::Left, SHIFT);
    press(&mut b, KeyCode::Char('c'), CTRL);
    assert_eq!(clipboard.text().as_deref(), Some("0"));

    let (mut b, clipboard) = builder_with(vec![sample_row(0)]);
    b.focus_cell(0, Field::Source);
    press(&mut b, KeyCode::Char('c'), CTRL);
    assert_eq!(clipboard.text(), None);

    press(&mut b, KeyCode::Esc, NONE);
    press(&mut b, KeyCode::Esc, NONE);
    press(&mut b, KeyCode::Char('v'), CTRL);
    let rows = b.rows();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[1].source, "s0");
    assert_eq!(rows[1].base_url, "https://site0.com");
}

#[test]
fn test_delete_key_clears_a_cell_range() {
    let rows = (0..3).map(sample_row).collect();
    let (mut b, _) = builder_with(rows);
    b.focus_cell(0, Field::Source);
    press(&mut b, KeyCode::Esc, NONE);
    press(&mut b, KeyCode::Down, SHIFT);
    press(&mut b, KeyCode::Right, SHIFT);

    press(&mut b, KeyCode::Delete, NONE);
    let rows = b.rows();
    for row in &rows[..2] {
        assert_eq!((row.source.as_str(), row.medium.as_str()), ("", ""));
    }
    assert_eq!(rows[0].campaign, "c0");
    assert_eq!(rows[0].base_url, "https://site0.com");
    assert_eq!(rows[2].source, "s2");

    assert!(b.undo());
    b.settle();
    assert_eq!(b.rows()[1].medium, "m1");
}
