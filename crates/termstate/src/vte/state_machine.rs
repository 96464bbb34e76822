//! The VT500-series input parser state diagram.
//!
//! This is the state machine from Paul Williams' parser description at
//! <https://vt100.net/emu/dec_ansi_parser>, written as one total transition
//! function. For every `(state, code point)` pair it yields the action to
//! run and, when the state changes, the successor state. The caller runs
//! exit-action, transition-action and entry-action in that order.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum State {
    Ground,
    Esc,
    EscInt,
    CsiEntry,
    CsiParam,
    CsiInt,
    CsiIgnore,
    DcsEntry,
    DcsParam,
    DcsInt,
    DcsPass,
    DcsIgnore,
    OscString,
    StIgnore,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Action {
    None,
    Ignore,
    Print,
    Execute,
    Clear,
    Collect,
    Param,
    EscDispatch,
    CsiDispatch,
    DcsStart,
    DcsCollect,
    DcsEnd,
    OscStart,
    OscCollect,
    OscEnd,
}

pub(crate) fn entry_action(state: State) -> Action {
    match state {
        State::Esc | State::CsiEntry | State::DcsEntry => Action::Clear,
        State::DcsPass => Action::DcsStart,
        State::OscString => Action::OscStart,
        _ => Action::None,
    }
}

pub(crate) fn exit_action(state: State) -> Action {
    match state {
        State::DcsPass => Action::DcsEnd,
        State::OscString => Action::OscEnd,
        _ => Action::None,
    }
}

/// Transition for one decoded code point. `None` as successor means the
/// machine stays in its state and neither entry nor exit actions run.
pub(crate) fn transition(state: State, cp: u32) -> (Option<State>, Action) {
    // Events valid in any state. These cover 0x80..=0x9f entirely, so the
    // per-state tables below never see C1 codes.
    match cp {
        0x18 | 0x1a | 0x80..=0x8f | 0x91..=0x97 | 0x99 | 0x9a | 0x9c => {
            return (Some(State::Ground), Action::Execute);
        }
        0x1b => return (Some(State::Esc), Action::None),
        0x98 | 0x9e | 0x9f => return (Some(State::StIgnore), Action::None),
        0x90 => return (Some(State::DcsEntry), Action::None),
        0x9d => return (Some(State::OscString), Action::None),
        0x9b => return (Some(State::CsiEntry), Action::None),
        _ => {}
    }

    match state {
        State::Ground => match cp {
            0x00..=0x17 | 0x19 | 0x1c..=0x1f => (None, Action::Execute),
            _ => (None, Action::Print),
        },
        State::Esc => match cp {
            0x00..=0x17 | 0x19 | 0x1c..=0x1f => (None, Action::Execute),
            0x7f => (None, Action::Ignore),
            0x5b => (Some(State::CsiEntry), Action::None),
            0x5d => (Some(State::OscString), Action::None),
            0x50 => (Some(State::DcsEntry), Action::None),
            0x58 | 0x5e | 0x5f => (Some(State::StIgnore), Action::None),
            0x30..=0x4f | 0x51..=0x57 | 0x59 | 0x5a | 0x5c | 0x60..=0x7e => {
                (Some(State::Ground), Action::EscDispatch)
            }
            _ => (Some(State::EscInt), Action::Collect),
        },
        State::EscInt => match cp {
            0x00..=0x17 | 0x19 | 0x1c..=0x1f => (None, Action::Execute),
            0x7f => (None, Action::Ignore),
            0x30..=0x7e => (Some(State::Ground), Action::EscDispatch),
            _ => (None, Action::Collect),
        },
        State::CsiEntry => match cp {
            0x00..=0x17 | 0x19 | 0x1c..=0x1f => (None, Action::Execute),
            0x7f => (None, Action::Ignore),
            0x20..=0x2f => (Some(State::CsiInt), Action::Collect),
            0x3a => (Some(State::CsiIgnore), Action::None),
            0x30..=0x39 | 0x3b => (Some(State::CsiParam), Action::Param),
            0x3c..=0x3f => (Some(State::CsiParam), Action::Collect),
            0x40..=0x7e => (Some(State::Ground), Action::CsiDispatch),
            _ => (Some(State::CsiIgnore), Action::None),
        },
        State::CsiParam => match cp {
            0x00..=0x17 | 0x19 | 0x1c..=0x1f => (None, Action::Execute),
            0x7f => (None, Action::Ignore),
            0x30..=0x39 | 0x3b => (None, Action::Param),
            0x3a | 0x3c..=0x3f => (Some(State::CsiIgnore), Action::None),
            0x20..=0x2f => (Some(State::CsiInt), Action::Collect),
            0x40..=0x7e => (Some(State::Ground), Action::CsiDispatch),
            _ => (Some(State::CsiIgnore), Action::None),
        },
        State::CsiInt => match cp {
            0x00..=0x17 | 0x19 | 0x1c..=0x1f => (None, Action::Execute),
            0x7f => (None, Action::Ignore),
            0x20..=0x2f => (None, Action::Collect),
            0x30..=0x3f => (Some(State::CsiIgnore), Action::None),
            0x40..=0x7e => (Some(State::Ground), Action::CsiDispatch),
            _ => (Some(State::CsiIgnore), Action::None),
        },
        State::CsiIgnore => match cp {
            0x00..=0x17 | 0x19 | 0x1c..=0x1f => (None, Action::Execute),
            0x40..=0x7e => (Some(State::Ground), Action::None),
            _ => (None, Action::Ignore),
        },
        State::DcsEntry => match cp {
            0x00..=0x17 | 0x19 | 0x1c..=0x1f | 0x7f => (None, Action::Ignore),
            0x3a => (Some(State::DcsIgnore), Action::None),
            0x20..=0x2f => (Some(State::DcsInt), Action::Collect),
            0x30..=0x39 | 0x3b => (Some(State::DcsParam), Action::Param),
            0x3c..=0x3f => (Some(State::DcsParam), Action::Collect),
            _ => (Some(State::DcsPass), Action::None),
        },
        State::DcsParam => match cp {
            0x00..=0x17 | 0x19 | 0x1c..=0x1f | 0x7f => (None, Action::Ignore),
            0x30..=0x39 | 0x3b => (None, Action::Param),
            0x3a | 0x3c..=0x3f => (Some(State::DcsIgnore), Action::None),
            0x20..=0x2f => (Some(State::DcsInt), Action::Collect),
            _ => (Some(State::DcsPass), Action::None),
        },
        State::DcsInt => match cp {
            0x00..=0x17 | 0x19 | 0x1c..=0x1f | 0x7f => (None, Action::Ignore),
            0x20..=0x2f => (None, Action::Collect),
            0x30..=0x3f => (Some(State::DcsIgnore), Action::None),
            _ => (Some(State::DcsPass), Action::None),
        },
        State::DcsPass => match cp {
            0x7f => (None, Action::Ignore),
            _ => (None, Action::DcsCollect),
        },
        State::DcsIgnore => (None, Action::Ignore),
        State::OscString => match cp {
            0x00..=0x06 | 0x08..=0x17 | 0x19 | 0x1c..=0x1f => (None, Action::Ignore),
            // BEL terminates like ST; the exit action fires the dispatch.
            0x07 => (Some(State::Ground), Action::None),
            _ => (None, Action::OscCollect),
        },
        State::StIgnore => (None, Action::Ignore),
    }
}
