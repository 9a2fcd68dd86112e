//! Parser state machine tables
//!
//! The parser is driven entirely by a (state, token) -> (next state, action)
//! table. Cells not listed as valid are syntax errors, which send the
//! parser back to `Text` so it can resynchronise on the next tag.

/// Lexer token kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    /// Whitespace run inside a tag, or an ignorable construct in text
    White,
    /// Start-tag marker `<`
    Open,
    /// Name, quoted value, or character data
    Name,
    /// `>`
    Close,
    /// `=`
    Equal,
    /// End-tag marker `</`
    EndTag,
    /// Empty-element marker `/>`
    Empty,
}

impl TokenKind {
    pub const ALL: [TokenKind; 7] = [
        TokenKind::White,
        TokenKind::Open,
        TokenKind::Name,
        TokenKind::Close,
        TokenKind::Equal,
        TokenKind::EndTag,
        TokenKind::Empty,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            TokenKind::White => "white",
            TokenKind::Open => "open",
            TokenKind::Name => "name",
            TokenKind::Close => "close",
            TokenKind::Equal => "equal",
            TokenKind::EndTag => "endtag",
            TokenKind::Empty => "empty",
        }
    }
}

/// Parser states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum State {
    /// Outside any tag
    Text,
    /// After `<`, awaiting the element name
    Opened,
    /// Have the element name, awaiting attributes or `>`
    Named,
    /// Have an attribute name, awaiting `=`
    AttrNamed,
    /// Awaiting the attribute value
    AttrEquals,
    /// Children parsed, awaiting the end-tag name
    EndOpen,
    /// Have the end-tag name, awaiting `>`
    EndNamed,
}

impl State {
    pub const ALL: [State; 7] = [
        State::Text,
        State::Opened,
        State::Named,
        State::AttrNamed,
        State::AttrEquals,
        State::EndOpen,
        State::EndNamed,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            State::Text => "text",
            State::Opened => "opened",
            State::Named => "named",
            State::AttrNamed => "attrnamed",
            State::AttrEquals => "attrequals",
            State::EndOpen => "endopen",
            State::EndNamed => "endnamed",
        }
    }
}

/// Parser actions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    Error,
    Nop,
    CreateElement,
    Pcdata,
    CreateAttribute,
    SetValue,
    Ascend,
    Descend,
    Verify,
}

impl Action {
    pub fn as_str(self) -> &'static str {
        match self {
            Action::Error => "error",
            Action::Nop => "nop",
            Action::CreateElement => "elem",
            Action::Pcdata => "pcdata",
            Action::CreateAttribute => "attr",
            Action::SetValue => "value",
            Action::Ascend => "up",
            Action::Descend => "down",
            Action::Verify => "check",
        }
    }
}

type Cell = (State, Action);

const ERR: Cell = (State::Text, Action::Error);

use Action as A;
use State as S;

/// Transition table, rows by state, columns by token:
/// White, Open, Name, Close, Equal, EndTag, Empty
const TABLE: [[Cell; 7]; 7] = [
    // Text
    [
        (S::Text, A::Pcdata),
        (S::Opened, A::Nop),
        (S::Text, A::Pcdata),
        (S::Text, A::Pcdata),
        (S::Text, A::Pcdata),
        (S::Text, A::Ascend),
        (S::Text, A::Pcdata),
    ],
    // Opened
    [ERR, ERR, (S::Named, A::CreateElement), ERR, ERR, ERR, ERR],
    // Named
    [
        (S::Named, A::Nop),
        ERR,
        (S::AttrNamed, A::CreateAttribute),
        (S::EndOpen, A::Descend),
        ERR,
        (S::Text, A::Nop),
        (S::Text, A::Nop),
    ],
    // AttrNamed
    [(S::AttrNamed, A::Nop), ERR, ERR, ERR, (S::AttrEquals, A::Nop), ERR, ERR],
    // AttrEquals
    [(S::AttrEquals, A::Nop), ERR, (S::Named, A::SetValue), ERR, ERR, ERR, ERR],
    // EndOpen
    [ERR, ERR, (S::EndNamed, A::Verify), ERR, ERR, ERR, ERR],
    // EndNamed
    [ERR, ERR, ERR, (S::Text, A::Nop), ERR, ERR, ERR],
];

/// Look up the next state and action
#[inline]
pub fn transition(state: State, token: TokenKind) -> (State, Action) {
    TABLE[state as usize][token as usize]
}

/// Render the valid transitions as a Graphviz digraph
pub fn to_dot() -> String {
    let mut out = String::from("digraph xml_parser {\n");
    out.push_str("\trankdir=LR;\n");
    out.push_str("\tsize=\"11,9\"\n");
    out.push_str("\tnode [shape = circle];\n");
    for token in TokenKind::ALL {
        for state in State::ALL {
            let (next, action) = transition(state, token);
            if action == Action::Error {
                continue;
            }
            out.push_str(&format!(
                "\t{} -> {} [ label = \"{} / {}\" ];\n",
                state.as_str(),
                next.as_str(),
                token.as_str(),
                action.as_str()
            ));
        }
    }
    out.push_str("}\n");
    out
}
