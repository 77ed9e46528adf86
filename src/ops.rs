//! The standard operator table, shared by the reader and the writer.

use hashbrown::HashMap;
use std::sync::LazyLock;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OpType {
    Xfx,
    Xfy,
    Yfx,
    Fy,
    Fx,
    Xf,
    Yf,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct OpDef {
    pub priority: u32,
    pub kind: OpType,
}

impl OpDef {
    /// Highest priority allowed for the left operand of an infix or
    /// postfix operator.
    pub fn left_max(self) -> u32 {
        match self.kind {
            OpType::Yfx | OpType::Yf => self.priority,
            _ => self.priority - 1,
        }
    }

    /// Highest priority allowed for the right operand of an infix or
    /// prefix operator.
    pub fn right_max(self) -> u32 {
        match self.kind {
            OpType::Xfy | OpType::Fy => self.priority,
            _ => self.priority - 1,
        }
    }
}

#[derive(Default)]
pub struct Ops {
    prefix: HashMap<&'static str, OpDef>,
    infix: HashMap<&'static str, OpDef>,
    postfix: HashMap<&'static str, OpDef>,
}

impl Ops {
    fn standard() -> Self {
        use OpType::*;
        let table: &[(u32, OpType, &[&'static str])] = &[
            (1200, Xfx, &[":-", "-->"]),
            (1200, Fx, &[":-", "?-"]),
            (1150, Fx, &["dynamic", "discontiguous", "initialization"]),
            (1100, Xfy, &[";", "|"]),
            (1050, Xfy, &["->"]),
            (1000, Xfy, &[","]),
            (900, Fy, &["\\+"]),
            (
                700,
                Xfx,
                &[
                    "=", "\\=", "==", "\\==", "@<", "@>", "@=<", "@>=", "=..", "is", "=:=", "=\\=",
                    "<", ">", "=<", ">=",
                ],
            ),
            (600, Xfy, &[":"]),
            (500, Yfx, &["+", "-", "/\\", "\\/", "xor"]),
            (400, Yfx, &["*", "/", "//", "rem", "mod", "div", "<<", ">>"]),
            (200, Xfx, &["**"]),
            (200, Xfy, &["^"]),
            (200, Fy, &["-", "+", "\\"]),
        ];
        let mut ops = Ops::default();
        for &(priority, kind, names) in table {
            let def = OpDef { priority, kind };
            let slot = match kind {
                Fx | Fy => &mut ops.prefix,
                Xf | Yf => &mut ops.postfix,
                _ => &mut ops.infix,
            };
            for &name in names {
                slot.insert(name, def);
            }
        }
        ops
    }

    pub fn prefix(&self, name: &str) -> Option<OpDef> {
        self.prefix.get(name).copied()
    }

    pub fn infix(&self, name: &str) -> Option<OpDef> {
        self.infix.get(name).copied()
    }

    pub fn postfix(&self, name: &str) -> Option<OpDef> {
        self.postfix.get(name).copied()
    }

    pub fn is_op(&self, name: &str) -> bool {
        self.prefix.contains_key(name)
            || self.infix.contains_key(name)
            || self.postfix.contains_key(name)
    }
}

static STANDARD: LazyLock<Ops> = LazyLock::new(Ops::standard);

pub fn ops() -> &'static Ops {
    &STANDARD
}
