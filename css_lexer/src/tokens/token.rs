//! Token definitions produced by the recognizers
//!
//! Every `*Start` token is matched by the corresponding `*End` token later in
//! the stream, with zero or more declaration tokens in between.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A `property: value` pair captured inside a ruleset or at-rule body
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Declaration {
    pub property: String,
    pub value: String,
    pub important: bool,
}

impl Declaration {
    pub fn new(property: impl Into<String>, value: impl Into<String>, important: bool) -> Self {
        Self {
            property: property.into(),
            value: value.into(),
            important,
        }
    }
}

impl fmt::Display for Declaration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.property, self.value)?;
        if self.important {
            write!(f, "!important")?;
        }
        write!(f, ";")
    }
}

/// Lexical token
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Token {
    /// `/* ... */`, payload is the text between the delimiters
    Comment { text: String },

    /// `@charset "X";`
    AtCharset { charset: String },

    AtFontFaceStart,
    AtFontFaceDeclaration(Declaration),
    AtFontFaceEnd,

    AtPageStart { selector: String },
    AtPageDeclaration(Declaration),
    AtPageEnd,

    AtVariablesStart { media_types: Vec<String> },
    AtVariablesDeclaration(Declaration),
    AtVariablesEnd,

    AtMediaStart { media_types: Vec<String> },
    AtMediaEnd,

    RulesetStart { selectors: Vec<String> },
    RulesetDeclaration(Declaration),
    RulesetEnd,

    /// Buffered text left over when the source ran out
    TrailingContent { text: String },
}

/// Payload-free classification of a token
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum TokenKind {
    Comment,
    AtCharset,
    AtFontFaceStart,
    AtFontFaceDeclaration,
    AtFontFaceEnd,
    AtPageStart,
    AtPageDeclaration,
    AtPageEnd,
    AtVariablesStart,
    AtVariablesDeclaration,
    AtVariablesEnd,
    AtMediaStart,
    AtMediaEnd,
    RulesetStart,
    RulesetDeclaration,
    RulesetEnd,
    TrailingContent,
}

/// Block families that open with a start token and close with an end token
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BlockFamily {
    FontFace,
    Page,
    Variables,
    Media,
    Ruleset,
}

impl TokenKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TokenKind::Comment => "comment",
            TokenKind::AtCharset => "at-charset",
            TokenKind::AtFontFaceStart => "at-font-face-start",
            TokenKind::AtFontFaceDeclaration => "at-font-face-declaration",
            TokenKind::AtFontFaceEnd => "at-font-face-end",
            TokenKind::AtPageStart => "at-page-start",
            TokenKind::AtPageDeclaration => "at-page-declaration",
            TokenKind::AtPageEnd => "at-page-end",
            TokenKind::AtVariablesStart => "at-variables-start",
            TokenKind::AtVariablesDeclaration => "at-variables-declaration",
            TokenKind::AtVariablesEnd => "at-variables-end",
            TokenKind::AtMediaStart => "at-media-start",
            TokenKind::AtMediaEnd => "at-media-end",
            TokenKind::RulesetStart => "ruleset-start",
            TokenKind::RulesetDeclaration => "ruleset-declaration",
            TokenKind::RulesetEnd => "ruleset-end",
            TokenKind::TrailingContent => "trailing-content",
        }
    }

    /// Family this kind opens, if it is a start token
    pub fn opens(&self) -> Option<BlockFamily> {
        match self {
            TokenKind::AtFontFaceStart => Some(BlockFamily::FontFace),
            TokenKind::AtPageStart => Some(BlockFamily::Page),
            TokenKind::AtVariablesStart => Some(BlockFamily::Variables),
            TokenKind::AtMediaStart => Some(BlockFamily::Media),
            TokenKind::RulesetStart => Some(BlockFamily::Ruleset),
            _ => None,
        }
    }

    /// Family this kind closes, if it is an end token
    pub fn closes(&self) -> Option<BlockFamily> {
        match self {
            TokenKind::AtFontFaceEnd => Some(BlockFamily::FontFace),
            TokenKind::AtPageEnd => Some(BlockFamily::Page),
            TokenKind::AtVariablesEnd => Some(BlockFamily::Variables),
            TokenKind::AtMediaEnd => Some(BlockFamily::Media),
            TokenKind::RulesetEnd => Some(BlockFamily::Ruleset),
            _ => None,
        }
    }

    pub fn is_declaration(&self) -> bool {
        matches!(
            self,
            TokenKind::AtFontFaceDeclaration
                | TokenKind::AtPageDeclaration
                | TokenKind::AtVariablesDeclaration
                | TokenKind::RulesetDeclaration
        )
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Token {
    pub fn kind(&self) -> TokenKind {
        match self {
            Token::Comment { .. } => TokenKind::Comment,
            Token::AtCharset { .. } => TokenKind::AtCharset,
            Token::AtFontFaceStart => TokenKind::AtFontFaceStart,
            Token::AtFontFaceDeclaration(_) => TokenKind::AtFontFaceDeclaration,
            Token::AtFontFaceEnd => TokenKind::AtFontFaceEnd,
            Token::AtPageStart { .. } => TokenKind::AtPageStart,
            Token::AtPageDeclaration(_) => TokenKind::AtPageDeclaration,
            Token::AtPageEnd => TokenKind::AtPageEnd,
            Token::AtVariablesStart { .. } => TokenKind::AtVariablesStart,
            Token::AtVariablesDeclaration(_) => TokenKind::AtVariablesDeclaration,
            Token::AtVariablesEnd => TokenKind::AtVariablesEnd,
            Token::AtMediaStart { .. } => TokenKind::AtMediaStart,
            Token::AtMediaEnd => TokenKind::AtMediaEnd,
            Token::RulesetStart { .. } => TokenKind::RulesetStart,
            Token::RulesetDeclaration(_) => TokenKind::RulesetDeclaration,
            Token::RulesetEnd => TokenKind::RulesetEnd,
            Token::TrailingContent { .. } => TokenKind::TrailingContent,
        }
    }

    /// The declaration carried by this token, for any declaration family
    pub fn declaration(&self) -> Option<&Declaration> {
        match self {
            Token::AtFontFaceDeclaration(decl)
            | Token::AtPageDeclaration(decl)
            | Token::AtVariablesDeclaration(decl)
            | Token::RulesetDeclaration(decl) => Some(decl),
            _ => None,
        }
    }

    pub fn comment(text: impl Into<String>) -> Self {
        Token::Comment { text: text.into() }
    }

    pub fn ruleset_start<S: Into<String>>(selectors: impl IntoIterator<Item = S>) -> Self {
        Token::RulesetStart {
            selectors: selectors.into_iter().map(Into::into).collect(),
        }
    }

    /// Render the token back to compact stylesheet text
    pub fn to_css(&self) -> String {
        match self {
            Token::Comment { text } => format!("/*{}*/", text),
            Token::AtCharset { charset } => format!("@charset \"{}\";", charset),
            Token::AtFontFaceStart => "@font-face{".to_string(),
            Token::AtPageStart { selector } if selector.is_empty() => "@page{".to_string(),
            Token::AtPageStart { selector } => format!("@page {}{{", selector),
            Token::AtVariablesStart { media_types } if media_types.is_empty() => {
                "@variables{".to_string()
            }
            Token::AtVariablesStart { media_types } => {
                format!("@variables {}{{", media_types.join(","))
            }
            Token::AtMediaStart { media_types } => format!("@media {}{{", media_types.join(",")),
            Token::RulesetStart { selectors } => format!("{}{{", selectors.join(",")),
            Token::AtFontFaceDeclaration(decl)
            | Token::AtPageDeclaration(decl)
            | Token::AtVariablesDeclaration(decl)
            | Token::RulesetDeclaration(decl) => decl.to_string(),
            Token::AtFontFaceEnd
            | Token::AtPageEnd
            | Token::AtVariablesEnd
            | Token::AtMediaEnd
            | Token::RulesetEnd => "}".to_string(),
            Token::TrailingContent { text } => text.clone(),
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_css())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_families() {
        assert_eq!(
            TokenKind::RulesetStart.opens(),
            Some(BlockFamily::Ruleset)
        );
        assert_eq!(TokenKind::AtPageEnd.closes(), Some(BlockFamily::Page));
        assert!(TokenKind::AtVariablesDeclaration.is_declaration());
        assert_eq!(TokenKind::Comment.opens(), None);
    }

    #[test]
    fn test_to_css() {
        let decl = Token::RulesetDeclaration(Declaration::new("color", "red", true));
        assert_eq!(decl.to_css(), "color:red!important;");
        assert_eq!(
            Token::ruleset_start([".a", ".b"]).to_css(),
            ".a,.b{"
        );
        assert_eq!(
            Token::AtCharset {
                charset: "UTF-8".into()
            }
            .to_css(),
            "@charset \"UTF-8\";"
        );
        assert_eq!(Token::comment(" x ").to_css(), "/* x */");
    }

    #[test]
    fn test_json_shape() {
        let token = Token::RulesetDeclaration(Declaration::new("color", "red", false));
        let json = serde_json::to_value(&token).unwrap();
        assert_eq!(json["kind"], "ruleset_declaration");
        assert_eq!(json["property"], "color");
        assert_eq!(json["important"], false);

        let back: Token = serde_json::from_value(json).unwrap();
        assert_eq!(back, token);
    }
}
