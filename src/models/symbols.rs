//! Static classification of mathematical glyphs and the LaTeX macro table.

use compact_str::CompactString;

use crate::error::SymbolError;

/// Spacing class of a glyph in math mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SymbolClass {
    Ordinary,
    BinaryOperation,
    Relation,
    Punctuation,
    Opening,
    Closing,
}

pub fn classify(c: char) -> Option<SymbolClass> {
    if is_ordinary(c) {
        return Some(SymbolClass::Ordinary);
    }
    match c {
        '+' | '\u{2212}' | '\u{2217}' => Some(SymbolClass::BinaryOperation),
        ',' | ';' => Some(SymbolClass::Punctuation),
        '(' | '[' | '{' => Some(SymbolClass::Opening),
        ')' | ']' | '}' => Some(SymbolClass::Closing),
        _ if is_relation(c) => Some(SymbolClass::Relation),
        _ => None,
    }
}

pub fn is_math_symbol(c: char) -> bool {
    classify(c).is_some()
}

fn is_ordinary(c: char) -> bool {
    c.is_ascii_digit()
        || matches!(c, '!' | '?' | '.' | '|' | '/' | '\u{2032}' | '@' | '"')
        || is_alphabetical(c)
}

fn is_alphabetical(c: char) -> bool {
    matches!(c as u32,
        0x0391..=0x03A9
            | 0x03B1..=0x03F5
            | 0x210E
            | 0x1D434..=0x1D467
            | 0x1D6E2..=0x1D71B
    )
}

fn is_relation(c: char) -> bool {
    matches!(c, '=' | '<' | '>' | ':' | '\u{2050}')
        || matches!(c as u32,
            0x2190..=0x21B3
                | 0x21B6..=0x21B7
                | 0x21BC..=0x21DD
                | 0x21E4..=0x21E5
                | 0x21F4..=0x21FF
                | 0x27F5..=0x27FC
        )
}

static LATEX_TO_UNICODE: &[(&str, char)] = &[
    ("alpha", '𝛼'),
    ("beta", '𝛽'),
    ("gamma", '𝛾'),
    ("delta", '𝛿'),
    ("epsilon", '𝜖'),
    ("varepsilon", '𝜀'),
    ("zeta", '𝜁'),
    ("eta", '𝜂'),
    ("theta", '𝜃'),
    ("vartheta", '𝜗'),
    ("iota", '𝜄'),
    ("kappa", '𝜅'),
    ("lambda", '𝜆'),
    ("mu", '𝜇'),
    ("nu", '𝜈'),
    ("xi", '𝜉'),
    ("pi", '𝜋'),
    ("varpi", '𝜛'),
    ("rho", '𝜌'),
    ("varrho", '𝜚'),
    ("sigma", '𝜎'),
    ("varsigma", '𝜍'),
    ("tau", '𝜏'),
    ("upsilon", '𝜐'),
    ("phi", '𝜙'),
    ("varphi", '𝜑'),
    ("chi", '𝜒'),
    ("psi", '𝜓'),
    ("omega", '𝜔'),
    ("Gamma", 'Γ'),
    ("varGamma", '𝛤'),
    ("Delta", 'Δ'),
    ("varDelta", '𝛥'),
    ("Theta", 'Θ'),
    ("varTheta", '𝛩'),
    ("Lambda", 'Λ'),
    ("varLambda", '𝛬'),
    ("Xi", 'Ξ'),
    ("varXi", '𝛯'),
    ("Pi", 'Π'),
    ("varPi", '𝛱'),
    ("Sigma", 'Σ'),
    ("varSigma", '𝛴'),
    ("Upsilon", 'Υ'),
    ("varUpsilon", '𝛶'),
    ("Phi", 'Φ'),
    ("varPhi", '𝛷'),
    ("Psi", 'Ψ'),
    ("varPsi", '𝛹'),
    ("Omega", 'Ω'),
    ("varOmega", '𝛺'),
    ("leftarrow", '←'),
    ("leftrightarrow", '↔'),
    ("rightarrow", '→'),
    ("mapsto", '↦'),
    ("longleftarrow", '⟵'),
    ("longleftrightarrow", '⟷'),
    ("longrightarrow", '⟶'),
    ("longmapsto", '⟼'),
    ("downarrow", '↓'),
    ("updownarrow", '↕'),
    ("uparrow", '↑'),
    ("nwarrow", '↖'),
    ("searrow", '↘'),
    ("nearrow", '↗'),
    ("swarrow", '↙'),
    ("nleftarrow", '↚'),
    ("nleftrightarrow", '↮'),
    ("nrightarrow", '↛'),
    ("hookleftarrow", '↩'),
    ("hookrightarrow", '↪'),
    ("twoheadleftarrow", '↞'),
    ("twoheadrightarrow", '↠'),
    ("leftarrowtail", '↢'),
    ("rightarrowtail", '↣'),
    ("Leftarrow", '⇐'),
    ("Leftrightarrow", '⇔'),
    ("Rightarrow", '⇒'),
    ("Longleftarrow", '⟸'),
    ("Longleftrightarrow", '⟺'),
    ("Longrightarrow", '⟹'),
    ("Updownarrow", '⇕'),
    ("Uparrow", '⇑'),
    ("Downarrow", '⇓'),
    ("nLeftarrow", '⇍'),
    ("nLeftrightarrow", '⇎'),
    ("nRightarrow", '⇏'),
    ("leftleftarrows", '⇇'),
    ("leftrightarrows", '⇆'),
    ("rightleftarrows", '⇄'),
    ("rightrightarrows", '⇉'),
    ("downdownarrows", '⇊'),
    ("upuparrows", '⇈'),
    ("curvearrowleft", '↶'),
    ("curvearrowright", '↷'),
    ("Lsh", '↰'),
    ("Rsh", '↱'),
    ("looparrowleft", '↫'),
    ("looparrowright", '↬'),
    ("leftrightsquigarrow", '↭'),
    ("leftsquigarrow", '⇜'),
    ("rightsquigarrow", '⇝'),
    ("Lleftarrow", '⇚'),
    ("leftharpoondown", '↽'),
    ("rightharpoondown", '⇁'),
    ("leftharpoonup", '↼'),
    ("rightharpoonup", '⇀'),
    ("rightleftharpoons", '⇌'),
    ("leftrightharpoons", '⇋'),
    ("downharpoonleft", '⇃'),
    ("upharpoonleft", '↿'),
    ("downharpoonright", '⇂'),
    ("upharpoonright", '↾'),
];

/// Maps a LaTeX macro name (without the backslash) to its glyph.
pub fn unicode_for_name(name: &str) -> Result<char, SymbolError> {
    LATEX_TO_UNICODE
        .iter()
        .find(|(macro_name, _)| *macro_name == name)
        .map(|(_, glyph)| *glyph)
        .ok_or_else(|| SymbolError::UnknownSymbol(CompactString::new(name)))
}

/// Glyph shown for the content of a math symbol leaf.
///
/// Leaf content is either a macro name or a single literal glyph; anything
/// else is rejected.
pub fn glyph_for_content(content: &str) -> Result<char, SymbolError> {
    let mut chars = content.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Ok(c),
        _ => unicode_for_name(content),
    }
}

#[cfg(test)]
#[path = "../../tests/unit/models/symbols.rs"]
mod tests;
