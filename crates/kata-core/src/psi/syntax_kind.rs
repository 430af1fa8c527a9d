//! Syntax kinds for Kotlin tokens and tree nodes
//!
//! One closed enum covers both the token kinds the lexer produces and the
//! node kinds the external AST supplies. External node-kind labels are
//! validated once at the ingestion boundary via [`KtSyntaxKind::from_label`];
//! an unknown label is a single well-defined error instead of string
//! comparisons scattered through the reconstruction code.

use std::fmt;

/// Syntax kind for Kotlin tokens and tree nodes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KtSyntaxKind {
    // Trivia
    Whitespace,
    Newline,
    CommentLine,
    CommentBlock,

    // Keywords
    PackageKw,
    ImportKw,
    ClassKw,
    InterfaceKw,
    ObjectKw,
    FunKw,
    ValKw,
    VarKw,
    TypealiasKw,
    ConstructorKw,
    InitKw,
    CompanionKw,
    ThisKw,
    SuperKw,
    IfKw,
    ElseKw,
    WhenKw,
    ForKw,
    WhileKw,
    DoKw,
    TryKw,
    CatchKw,
    FinallyKw,
    ReturnKw,
    ThrowKw,
    BreakKw,
    ContinueKw,
    AsKw,
    IsKw,
    InKw,
    NotIs,
    NotIn,
    NullKw,
    TrueKw,
    FalseKw,

    // Punctuation and operators
    LParen,
    RParen,
    LBrace,
    RBrace,
    LBracket,
    RBracket,
    Comma,
    Dot,
    Semicolon,
    Colon,
    ColonColon,
    Question,
    At,
    Arrow,
    DoubleArrow,
    Eq,
    EqEq,
    EqEqEq,
    ExclEq,
    ExclEqEq,
    Excl,
    ExclExcl,
    Lt,
    Gt,
    LtEq,
    GtEq,
    Plus,
    PlusPlus,
    PlusEq,
    Minus,
    MinusMinus,
    MinusEq,
    Mul,
    MulEq,
    Div,
    DivEq,
    Perc,
    PercEq,
    AndAnd,
    OrOr,
    Range,
    RangeUntil,
    Elvis,
    SafeAccess,

    // Literals and identifiers
    Identifier,
    IntegerLiteral,
    FloatLiteral,
    CharacterLiteral,
    StringLiteral,

    // Unrecognized input (the lexer is total)
    Unknown,

    // Tree nodes, as labeled by the external AST
    File,
    PackageDirective,
    ImportList,
    ImportDirective,
    Class,
    ClassBody,
    Fun,
    Property,
    Typealias,
    ModifierList,
    ValueParameterList,
    ValueParameter,
    TypeReference,
    UserType,
    TypeArgumentList,
    TypeProjection,
    ReferenceExpression,
    OperationReference,
    DotQualifiedExpression,
    CallExpression,
    ValueArgumentList,
    ValueArgument,
    BinaryExpression,
    PrefixExpression,
    Parenthesized,
    IntegerConstant,
    FloatConstant,
    BooleanConstant,
    CharacterConstant,
    NullConstant,
    StringTemplate,
    Block,

    /// Synthesized during gap repair; never produced by the external AST
    Parenthesis,
}

impl KtSyntaxKind {
    /// Resolve an external AST node-kind label
    ///
    /// Accepts both composite node labels and the leaf token labels that
    /// appear as direct children in the external tree.
    pub fn from_label(label: &str) -> Option<KtSyntaxKind> {
        use KtSyntaxKind::*;
        Some(match label {
            "FILE" => File,
            "PACKAGE_DIRECTIVE" => PackageDirective,
            "IMPORT_LIST" => ImportList,
            "IMPORT_DIRECTIVE" => ImportDirective,
            "CLASS" => Class,
            "CLASS_BODY" => ClassBody,
            "FUN" => Fun,
            "PROPERTY" => Property,
            "TYPEALIAS" => Typealias,
            "MODIFIER_LIST" => ModifierList,
            "VALUE_PARAMETER_LIST" => ValueParameterList,
            "VALUE_PARAMETER" => ValueParameter,
            "TYPE_REFERENCE" => TypeReference,
            "USER_TYPE" => UserType,
            "TYPE_ARGUMENT_LIST" => TypeArgumentList,
            "TYPE_PROJECTION" => TypeProjection,
            "REFERENCE_EXPRESSION" => ReferenceExpression,
            "OPERATION_REFERENCE" => OperationReference,
            "DOT_QUALIFIED_EXPRESSION" => DotQualifiedExpression,
            "CALL_EXPRESSION" => CallExpression,
            "VALUE_ARGUMENT_LIST" => ValueArgumentList,
            "VALUE_ARGUMENT" => ValueArgument,
            "BINARY_EXPRESSION" => BinaryExpression,
            "PREFIX_EXPRESSION" => PrefixExpression,
            "PARENTHESIZED" => Parenthesized,
            "INTEGER_CONSTANT" => IntegerConstant,
            "FLOAT_CONSTANT" => FloatConstant,
            "BOOLEAN_CONSTANT" => BooleanConstant,
            "CHARACTER_CONSTANT" => CharacterConstant,
            "NULL" => NullConstant,
            "STRING_TEMPLATE" => StringTemplate,
            "BLOCK" => Block,
            "WHITE_SPACE" => Whitespace,
            "EOL_COMMENT" => CommentLine,
            "BLOCK_COMMENT" => CommentBlock,
            "IDENTIFIER" => Identifier,
            "INTEGER_LITERAL" => IntegerLiteral,
            "FLOAT_LITERAL" => FloatLiteral,
            "CHARACTER_LITERAL" => CharacterLiteral,
            "STRING_LITERAL" => StringLiteral,
            "LPAR" => LParen,
            "RPAR" => RParen,
            "LBRACE" => LBrace,
            "RBRACE" => RBrace,
            "LBRACKET" => LBracket,
            "RBRACKET" => RBracket,
            "COMMA" => Comma,
            "DOT" => Dot,
            "SEMICOLON" => Semicolon,
            "COLON" => Colon,
            "COLONCOLON" => ColonColon,
            "EQ" => Eq,
            "OPERATION" => OperationReference,
            "val" => ValKw,
            "var" => VarKw,
            "fun" => FunKw,
            "class" => ClassKw,
            "interface" => InterfaceKw,
            "object" => ObjectKw,
            "typealias" => TypealiasKw,
            "package" => PackageKw,
            "import" => ImportKw,
            _ => return None,
        })
    }

    /// Stable display label, matching the external AST vocabulary where one
    /// exists
    pub fn label(&self) -> &'static str {
        use KtSyntaxKind::*;
        match self {
            Whitespace => "WHITE_SPACE",
            Newline => "NEWLINE",
            CommentLine => "EOL_COMMENT",
            CommentBlock => "BLOCK_COMMENT",
            PackageKw => "package",
            ImportKw => "import",
            ClassKw => "class",
            InterfaceKw => "interface",
            ObjectKw => "object",
            FunKw => "fun",
            ValKw => "val",
            VarKw => "var",
            TypealiasKw => "typealias",
            ConstructorKw => "constructor",
            InitKw => "init",
            CompanionKw => "companion",
            ThisKw => "this",
            SuperKw => "super",
            IfKw => "if",
            ElseKw => "else",
            WhenKw => "when",
            ForKw => "for",
            WhileKw => "while",
            DoKw => "do",
            TryKw => "try",
            CatchKw => "catch",
            FinallyKw => "finally",
            ReturnKw => "return",
            ThrowKw => "throw",
            BreakKw => "break",
            ContinueKw => "continue",
            AsKw => "as",
            IsKw => "is",
            InKw => "in",
            NotIs => "NOT_IS",
            NotIn => "NOT_IN",
            NullKw => "null",
            TrueKw => "true",
            FalseKw => "false",
            LParen => "LPAR",
            RParen => "RPAR",
            LBrace => "LBRACE",
            RBrace => "RBRACE",
            LBracket => "LBRACKET",
            RBracket => "RBRACKET",
            Comma => "COMMA",
            Dot => "DOT",
            Semicolon => "SEMICOLON",
            Colon => "COLON",
            ColonColon => "COLONCOLON",
            Question => "QUEST",
            At => "AT",
            Arrow => "ARROW",
            DoubleArrow => "DOUBLE_ARROW",
            Eq => "EQ",
            EqEq => "EQEQ",
            EqEqEq => "EQEQEQ",
            ExclEq => "EXCLEQ",
            ExclEqEq => "EXCLEQEQ",
            Excl => "EXCL",
            ExclExcl => "EXCLEXCL",
            Lt => "LT",
            Gt => "GT",
            LtEq => "LTEQ",
            GtEq => "GTEQ",
            Plus => "PLUS",
            PlusPlus => "PLUSPLUS",
            PlusEq => "PLUSEQ",
            Minus => "MINUS",
            MinusMinus => "MINUSMINUS",
            MinusEq => "MINUSEQ",
            Mul => "MUL",
            MulEq => "MULTEQ",
            Div => "DIV",
            DivEq => "DIVEQ",
            Perc => "PERC",
            PercEq => "PERCEQ",
            AndAnd => "ANDAND",
            OrOr => "OROR",
            Range => "RANGE",
            RangeUntil => "RANGE_UNTIL",
            Elvis => "ELVIS",
            SafeAccess => "SAFE_ACCESS",
            Identifier => "IDENTIFIER",
            IntegerLiteral => "INTEGER_LITERAL",
            FloatLiteral => "FLOAT_LITERAL",
            CharacterLiteral => "CHARACTER_LITERAL",
            StringLiteral => "STRING_LITERAL",
            Unknown => "UNKNOWN",
            File => "FILE",
            PackageDirective => "PACKAGE_DIRECTIVE",
            ImportList => "IMPORT_LIST",
            ImportDirective => "IMPORT_DIRECTIVE",
            Class => "CLASS",
            ClassBody => "CLASS_BODY",
            Fun => "FUN",
            Property => "PROPERTY",
            Typealias => "TYPEALIAS",
            ModifierList => "MODIFIER_LIST",
            ValueParameterList => "VALUE_PARAMETER_LIST",
            ValueParameter => "VALUE_PARAMETER",
            TypeReference => "TYPE_REFERENCE",
            UserType => "USER_TYPE",
            TypeArgumentList => "TYPE_ARGUMENT_LIST",
            TypeProjection => "TYPE_PROJECTION",
            ReferenceExpression => "REFERENCE_EXPRESSION",
            OperationReference => "OPERATION_REFERENCE",
            DotQualifiedExpression => "DOT_QUALIFIED_EXPRESSION",
            CallExpression => "CALL_EXPRESSION",
            ValueArgumentList => "VALUE_ARGUMENT_LIST",
            ValueArgument => "VALUE_ARGUMENT",
            BinaryExpression => "BINARY_EXPRESSION",
            PrefixExpression => "PREFIX_EXPRESSION",
            Parenthesized => "PARENTHESIZED",
            IntegerConstant => "INTEGER_CONSTANT",
            FloatConstant => "FLOAT_CONSTANT",
            BooleanConstant => "BOOLEAN_CONSTANT",
            CharacterConstant => "CHARACTER_CONSTANT",
            NullConstant => "NULL",
            StringTemplate => "STRING_TEMPLATE",
            Block => "BLOCK",
            Parenthesis => "PARENTHESIS",
        }
    }

    /// Whitespace tokens, the only kind a reconstruction gap may skip
    pub fn is_whitespace(&self) -> bool {
        matches!(self, KtSyntaxKind::Whitespace | KtSyntaxKind::Newline)
    }

    /// Whitespace or comments
    pub fn is_trivia(&self) -> bool {
        self.is_whitespace()
            || matches!(self, KtSyntaxKind::CommentLine | KtSyntaxKind::CommentBlock)
    }
}

impl fmt::Display for KtSyntaxKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
