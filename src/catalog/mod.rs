//! Rule Catalog: static tables mapping legacy spellings to QB64 spellings.
//!
//! Everything in this module is pure data. Passes read it through the
//! [`RuleCatalog`] view, which picks the table tiers that apply to the
//! selected [`SourceDialect`].
//!
//! # Tiers
//!
//! - **Core** keywords exist in every dialect, GW-BASIC included.
//! - **Structured** keywords arrived with QBasic/QuickBASIC (`SUB`, `SELECT`,
//!   `DO`, `TYPE`, ...). In a GW-BASIC program those words are not keywords,
//!   so they are left alone.
//! - **Compiled** keywords only exist in the QuickBASIC compiler.

mod sigils;

pub use sigils::{split_sigil, TypeSigil, SIGILS};

use crate::porting::SourceDialect;

/// A `(legacy, modern)` spelling pair.
pub type RenameRule = (&'static str, &'static str);

/// Keywords shared by every supported dialect.
pub const CORE_KEYWORDS: &[RenameRule] = &[
    ("PRINT", "Print"),
    ("INPUT", "Input"),
    ("LET", "Let"),
    ("IF", "If"),
    ("THEN", "Then"),
    ("ELSE", "Else"),
    ("END", "End"),
    ("GOTO", "GoTo"),
    ("GOSUB", "GoSub"),
    ("RETURN", "Return"),
    ("FOR", "For"),
    ("TO", "To"),
    ("STEP", "Step"),
    ("NEXT", "Next"),
    ("WHILE", "While"),
    ("WEND", "Wend"),
    ("DIM", "Dim"),
    ("AS", "As"),
    ("ON", "On"),
    ("ERROR", "Error"),
    ("RESUME", "Resume"),
    ("STOP", "Stop"),
    ("CLS", "Cls"),
    ("LOCATE", "Locate"),
    ("COLOR", "Color"),
    ("SCREEN", "Screen"),
    ("WIDTH", "Width"),
    ("READ", "Read"),
    ("DATA", "Data"),
    ("RESTORE", "Restore"),
    ("RANDOMIZE", "Randomize"),
    ("TIMER", "Timer"),
    ("OPEN", "Open"),
    ("CLOSE", "Close"),
    ("OUTPUT", "Output"),
    ("APPEND", "Append"),
    ("RANDOM", "Random"),
    ("WRITE", "Write"),
    ("LINE", "Line"),
    ("CIRCLE", "Circle"),
    ("PSET", "PSet"),
    ("PRESET", "PReset"),
    ("PAINT", "Paint"),
    ("DRAW", "Draw"),
    ("BEEP", "Beep"),
    ("SOUND", "Sound"),
    ("PLAY", "Play"),
    ("KEY", "Key"),
    ("SWAP", "Swap"),
    ("ERASE", "Erase"),
    ("CHAIN", "Chain"),
    ("COMMON", "Common"),
    ("DEFINT", "DefInt"),
    ("DEFLNG", "DefLng"),
    ("DEFSNG", "DefSng"),
    ("DEFDBL", "DefDbl"),
    ("DEFSTR", "DefStr"),
    ("AND", "And"),
    ("OR", "Or"),
    ("NOT", "Not"),
    ("XOR", "Xor"),
    ("EQV", "Eqv"),
    ("IMP", "Imp"),
    ("MOD", "Mod"),
    ("USING", "Using"),
    ("SYSTEM", "System"),
];

/// Keywords introduced by QBasic and QuickBASIC.
pub const STRUCTURED_KEYWORDS: &[RenameRule] = &[
    ("SUB", "Sub"),
    ("FUNCTION", "Function"),
    ("CALL", "Call"),
    ("DECLARE", "Declare"),
    ("SELECT", "Select"),
    ("CASE", "Case"),
    ("IS", "Is"),
    ("DO", "Do"),
    ("LOOP", "Loop"),
    ("UNTIL", "Until"),
    ("ELSEIF", "ElseIf"),
    ("EXIT", "Exit"),
    ("TYPE", "Type"),
    ("CONST", "Const"),
    ("SHARED", "Shared"),
    ("STATIC", "Static"),
    ("REDIM", "ReDim"),
    ("INTEGER", "Integer"),
    ("LONG", "Long"),
    ("SINGLE", "Single"),
    ("DOUBLE", "Double"),
    ("STRING", "String"),
    ("SLEEP", "Sleep"),
    ("BYVAL", "ByVal"),
];

/// Keywords only understood by the QuickBASIC compiler.
pub const COMPILED_KEYWORDS: &[RenameRule] = &[
    ("SETMEM", "SetMem"),
    ("SEG", "Seg"),
    ("ALIAS", "Alias"),
    ("CDECL", "CDecl"),
];

/// Legacy string-function spellings.
pub const STRING_FUNCTIONS: &[RenameRule] = &[
    ("MID$", "Mid$"),
    ("LEFT$", "Left$"),
    ("RIGHT$", "Right$"),
    ("CHR$", "Chr$"),
    ("STR$", "Str$"),
    ("LTRIM$", "LTrim$"),
    ("RTRIM$", "RTrim$"),
    ("UCASE$", "UCase$"),
    ("LCASE$", "LCase$"),
    ("SPACE$", "Space$"),
    ("STRING$", "String$"),
    ("INKEY$", "InKey$"),
    ("INPUT$", "Input$"),
    ("HEX$", "Hex$"),
    ("OCT$", "Oct$"),
    ("DATE$", "Date$"),
    ("TIME$", "Time$"),
    ("LEN", "Len"),
    ("ASC", "Asc"),
    ("VAL", "Val"),
    ("INSTR", "InStr"),
    ("LBOUND", "LBound"),
    ("UBOUND", "UBound"),
];

/// Legacy math-function spellings.
pub const MATH_FUNCTIONS: &[RenameRule] = &[
    ("ABS", "Abs"),
    ("ATN", "Atn"),
    ("COS", "Cos"),
    ("SIN", "Sin"),
    ("TAN", "Tan"),
    ("EXP", "Exp"),
    ("LOG", "Log"),
    ("SQR", "Sqr"),
    ("SGN", "Sgn"),
    ("INT", "Int"),
    ("FIX", "Fix"),
    ("RND", "Rnd"),
    ("CINT", "CInt"),
    ("CLNG", "CLng"),
    ("CSNG", "CSng"),
    ("CDBL", "CDbl"),
];

/// Field type names accepted in `TYPE` blocks, legacy and QB64 extended.
pub const FIELD_TYPES: &[RenameRule] = &[
    ("INTEGER", "Integer"),
    ("LONG", "Long"),
    ("SINGLE", "Single"),
    ("DOUBLE", "Double"),
    ("STRING", "String"),
    ("_BIT", "_Bit"),
    ("_BYTE", "_Byte"),
    ("_INTEGER64", "_Integer64"),
    ("_FLOAT", "_Float"),
    ("_OFFSET", "_Offset"),
    ("_UNSIGNED", "_Unsigned"),
];

/// A legacy screen mode and the QB64 canvas size that reproduces it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScreenMode {
    /// The `SCREEN` mode number.
    pub mode: u8,
    /// Width in pixels.
    pub width: u16,
    /// Height in pixels.
    pub height: u16,
}

/// Legacy graphics modes that QB64 can reproduce on a `_NewImage` canvas.
pub const SCREEN_MODES: &[ScreenMode] = &[
    ScreenMode { mode: 7, width: 320, height: 200 },
    ScreenMode { mode: 9, width: 640, height: 350 },
    ScreenMode { mode: 12, width: 640, height: 480 },
    ScreenMode { mode: 13, width: 320, height: 200 },
];

/// A named group of rename tables, reported as one unit.
#[derive(Debug, Clone)]
pub struct RuleTable {
    /// Noun used in the transformation record, e.g. "keyword".
    pub label: &'static str,
    /// The tables making up the group.
    pub tiers: Vec<&'static [RenameRule]>,
}

impl RuleTable {
    /// Iterates over every rename pair in the group.
    pub fn rules(&self) -> impl Iterator<Item = &RenameRule> + '_ {
        self.tiers.iter().flat_map(|tier| tier.iter())
    }
}

/// The catalog view for one dialect.
#[derive(Debug, Clone, Copy)]
pub struct RuleCatalog {
    dialect: SourceDialect,
}

impl RuleCatalog {
    /// Creates the catalog view for `dialect`.
    pub fn for_dialect(dialect: SourceDialect) -> Self {
        Self { dialect }
    }

    /// Keyword tiers that apply to the dialect, oldest first.
    pub fn keyword_tiers(&self) -> Vec<&'static [RenameRule]> {
        match self.dialect {
            SourceDialect::GwBasic => vec![CORE_KEYWORDS],
            SourceDialect::QBasic => vec![CORE_KEYWORDS, STRUCTURED_KEYWORDS],
            SourceDialect::QuickBasic => {
                vec![CORE_KEYWORDS, STRUCTURED_KEYWORDS, COMPILED_KEYWORDS]
            }
        }
    }

    /// The rename groups in application order: keywords (all applicable
    /// tiers together), string functions, math functions.
    pub fn tables(&self) -> Vec<RuleTable> {
        vec![
            RuleTable {
                label: "keyword",
                tiers: self.keyword_tiers(),
            },
            RuleTable {
                label: "string function name",
                tiers: vec![STRING_FUNCTIONS],
            },
            RuleTable {
                label: "math function name",
                tiers: vec![MATH_FUNCTIONS],
            },
        ]
    }

    /// Looks up the canonical spelling of a `TYPE` field type name.
    pub fn field_type(&self, name: &str) -> Option<&'static str> {
        lookup(FIELD_TYPES, name)
    }

    /// Looks up a legacy screen mode.
    pub fn screen_mode(&self, mode: u8) -> Option<ScreenMode> {
        SCREEN_MODES.iter().copied().find(|m| m.mode == mode)
    }
}

/// Case-insensitive lookup of `name` in a rename table.
pub fn lookup(rules: &[RenameRule], name: &str) -> Option<&'static str> {
    rules
        .iter()
        .find(|(legacy, _)| legacy.eq_ignore_ascii_case(name))
        .map(|(_, modern)| *modern)
}
