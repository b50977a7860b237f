//! Right-to-left display helper for terminals that render left-to-right only.
//!
//! Arabic text is shaped into presentation forms (so letters connect) and then
//! reversed. Text without Arabic characters is returned untouched.

use std::borrow::Cow;

/// Presentation forms: (isolated, initial, medial, final). `None` means the
/// letter has no such form and does not connect in that direction.
type Forms = (char, Option<char>, Option<char>, Option<char>);

fn forms(c: char) -> Option<Forms> {
    let f = |iso: u32, ini: u32, med: u32, fin: u32| -> Forms {
        let opt = |cp: u32| if cp == 0 { None } else { char::from_u32(cp) };
        (char::from_u32(iso).unwrap_or(c), opt(ini), opt(med), opt(fin))
    };
    let forms = match c {
        '\u{0621}' => f(0xFE80, 0, 0, 0),
        '\u{0622}' => f(0xFE81, 0, 0, 0xFE82),
        '\u{0623}' => f(0xFE83, 0, 0, 0xFE84),
        '\u{0624}' => f(0xFE85, 0, 0, 0xFE86),
        '\u{0625}' => f(0xFE87, 0, 0, 0xFE88),
        '\u{0626}' => f(0xFE89, 0xFE8B, 0xFE8C, 0xFE8A),
        '\u{0627}' => f(0xFE8D, 0, 0, 0xFE8E),
        '\u{0628}' => f(0xFE8F, 0xFE91, 0xFE92, 0xFE90),
        '\u{0629}' => f(0xFE93, 0, 0, 0xFE94),
        '\u{062A}' => f(0xFE95, 0xFE97, 0xFE98, 0xFE96),
        '\u{062B}' => f(0xFE99, 0xFE9B, 0xFE9C, 0xFE9A),
        '\u{062C}' => f(0xFE9D, 0xFE9F, 0xFEA0, 0xFE9E),
        '\u{062D}' => f(0xFEA1, 0xFEA3, 0xFEA4, 0xFEA2),
        '\u{062E}' => f(0xFEA5, 0xFEA7, 0xFEA8, 0xFEA6),
        '\u{062F}' => f(0xFEA9, 0, 0, 0xFEAA),
        '\u{0630}' => f(0xFEAB, 0, 0, 0xFEAC),
        '\u{0631}' => f(0xFEAD, 0, 0, 0xFEAE),
        '\u{0632}' => f(0xFEAF, 0, 0, 0xFEB0),
        '\u{0633}' => f(0xFEB1, 0xFEB3, 0xFEB4, 0xFEB2),
        '\u{0634}' => f(0xFEB5, 0xFEB7, 0xFEB8, 0xFEB6),
        '\u{0635}' => f(0xFEB9, 0xFEBB, 0xFEBC, 0xFEBA),
        '\u{0636}' => f(0xFEBD, 0xFEBF, 0xFEC0, 0xFEBE),
        '\u{0637}' => f(0xFEC1, 0xFEC3, 0xFEC4, 0xFEC2),
        '\u{0638}' => f(0xFEC5, 0xFEC7, 0xFEC8, 0xFEC6),
        '\u{0639}' => f(0xFEC9, 0xFECB, 0xFECC, 0xFECA),
        '\u{063A}' => f(0xFECD, 0xFECF, 0xFED0, 0xFECE),
        '\u{0640}' => f(0x0640, 0x0640, 0x0640, 0x0640),
        '\u{0641}' => f(0xFED1, 0xFED3, 0xFED4, 0xFED2),
        '\u{0642}' => f(0xFED5, 0xFED7, 0xFED8, 0xFED6),
        '\u{0643}' => f(0xFED9, 0xFEDB, 0xFEDC, 0xFEDA),
        '\u{0644}' => f(0xFEDD, 0xFEDF, 0xFEE0, 0xFEDE),
        '\u{0645}' => f(0xFEE1, 0xFEE3, 0xFEE4, 0xFEE2),
        '\u{0646}' => f(0xFEE5, 0xFEE7, 0xFEE8, 0xFEE6),
        '\u{0647}' => f(0xFEE9, 0xFEEB, 0xFEEC, 0xFEEA),
        '\u{0648}' => f(0xFEED, 0, 0, 0xFEEE),
        '\u{0649}' => f(0xFEEF, 0, 0, 0xFEF0),
        '\u{064A}' => f(0xFEF1, 0xFEF3, 0xFEF4, 0xFEF2),
        // Persian and Urdu letters
        '\u{067E}' => f(0xFB56, 0xFB58, 0xFB59, 0xFB57),
        '\u{0686}' => f(0xFB7A, 0xFB7C, 0xFB7D, 0xFB7B),
        '\u{0698}' => f(0xFB8A, 0, 0, 0xFB8B),
        '\u{06A9}' => f(0xFB8E, 0xFB90, 0xFB91, 0xFB8F),
        '\u{06AF}' => f(0xFB92, 0xFB94, 0xFB95, 0xFB93),
        '\u{06CC}' => f(0xFBFC, 0xFBFE, 0xFBFF, 0xFBFD),
        _ => return None,
    };
    Some(forms)
}

/// Lam-alef ligature (isolated, final) for the alef variant following a lam.
fn lam_alef(alef: char) -> Option<(char, char)> {
    match alef {
        '\u{0622}' => Some(('\u{FEF5}', '\u{FEF6}')),
        '\u{0623}' => Some(('\u{FEF7}', '\u{FEF8}')),
        '\u{0625}' => Some(('\u{FEF9}', '\u{FEFA}')),
        '\u{0627}' => Some(('\u{FEFB}', '\u{FEFC}')),
        _ => None,
    }
}

/// Harakat and other marks that do not break a joining sequence.
fn is_transparent(c: char) -> bool {
    matches!(c, '\u{0610}'..='\u{061A}' | '\u{064B}'..='\u{065F}' | '\u{0670}' | '\u{06D6}'..='\u{06ED}')
}

fn has_arabic(text: &str) -> bool {
    text.chars().any(|c| ('\u{0600}'..='\u{06FF}').contains(&c))
}

/// Whether the letter can join the letter after it (has initial/medial forms).
fn joins_forward(c: char) -> bool {
    forms(c).is_some_and(|(_, ini, _, _)| ini.is_some())
}

/// Whether the letter can join the letter before it (has a final form).
fn joins_backward(c: char) -> bool {
    forms(c).is_some_and(|(_, _, _, fin)| fin.is_some())
}

/// Shape Arabic letters into presentation forms, keeping logical order.
pub fn shape(text: &str) -> String {
    let chars: Vec<char> = text.chars().collect();
    let mut out = String::with_capacity(text.len());
    // whether the previous shaped letter connects to the next one
    let mut prev_connects = false;
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        if is_transparent(c) {
            out.push(c);
            i += 1;
            continue;
        }
        let Some((iso, ini, med, fin)) = forms(c) else {
            out.push(c);
            prev_connects = false;
            i += 1;
            continue;
        };

        let next_idx = (i + 1..chars.len()).find(|&j| !is_transparent(chars[j]));

        if c == '\u{0644}' {
            if let Some((lig_iso, lig_fin)) = next_idx.and_then(|j| lam_alef(chars[j])) {
                out.push(if prev_connects { lig_fin } else { lig_iso });
                // keep marks that sat between lam and alef
                let j = next_idx.unwrap_or(i + 1);
                out.extend(&chars[i + 1..j]);
                prev_connects = false;
                i = j + 1;
                continue;
            }
        }

        let next_joins = ini.is_some() && next_idx.is_some_and(|j| joins_backward(chars[j]));
        let shaped = match (prev_connects, next_joins) {
            (false, false) => iso,
            (false, true) => ini.unwrap_or(iso),
            (true, true) => med.unwrap_or(iso),
            (true, false) => fin.unwrap_or(iso),
        };
        out.push(shaped);
        prev_connects = next_joins && joins_forward(c);
        i += 1;
    }
    out
}

/// Display form for a left-to-right terminal: shaped and reversed when the
/// text contains Arabic, unchanged otherwise.
pub fn reshape(text: &str) -> Cow<'_, str> {
    if !has_arabic(text) {
        return Cow::Borrowed(text);
    }
    Cow::Owned(shape(text).chars().rev().collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_latin_untouched() {
        assert!(matches!(reshape("Hello (Next 10)"), Cow::Borrowed("Hello (Next 10)")));
        assert_eq!(reshape(""), "");
    }

    #[test]
    fn test_connects_and_reverses() {
        // baa + alef + baa: initial, final, isolated (alef does not join forward)
        assert_eq!(reshape("باب"), "\u{FE8F}\u{FE8E}\u{FE91}");
        // seen + lam-alef ligature (final form) + meem isolated
        assert_eq!(reshape("سلام"), "\u{FEE1}\u{FEFC}\u{FEB3}");
    }

    #[test]
    fn test_lam_alef_isolated() {
        assert_eq!(shape("لا"), "\u{FEFB}");
    }

    #[test]
    fn test_medial_and_word_boundary() {
        // beh beh beh: initial, medial, final
        assert_eq!(shape("ببب"), "\u{FE91}\u{FE92}\u{FE90}");
        // space breaks the join
        assert_eq!(shape("ب ب"), "\u{FE8F} \u{FE8F}");
    }

    #[test]
    fn test_persian_letters_join() {
        // peh + yeh farsi: initial, final; reversed for display
        assert_eq!(reshape("پی"), "\u{FBFD}\u{FB58}");
        // keheh gaf keheh: initial, medial, final
        assert_eq!(shape("کگک"), "\u{FB90}\u{FB95}\u{FB8F}");
        // jeh only joins backward, so the tcheh after it is isolated
        assert_eq!(shape("ژچ"), "\u{FB8A}\u{FB7A}");
    }

    #[test]
    fn test_harakat_are_transparent() {
        // beh + fatha + beh still joins
        assert_eq!(shape("بَب"), "\u{FE91}\u{064E}\u{FE90}");
    }
}
