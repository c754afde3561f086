//! Spreadsheet cell values with total conversions.
//!
//! Quantity and id columns arrive as numbers, numeric strings, blanks or
//! junk depending on who exported the sheet. Every conversion here returns a
//! value for every input instead of failing the row.

use calamine::Data;

#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Empty,
    Text(String),
    Number(f64),
}

impl CellValue {
    /// Converts a calamine cell. Errors and booleans are not meaningful here
    /// and read as empty / text respectively.
    #[must_use]
    pub fn from_calamine(data: &Data) -> Self {
        match data {
            Data::Empty | Data::Error(_) => CellValue::Empty,
            Data::String(s) | Data::DateTimeIso(s) | Data::DurationIso(s) => {
                CellValue::from_text(s)
            }
            Data::Float(f) => CellValue::Number(*f),
            #[allow(clippy::cast_precision_loss)]
            Data::Int(i) => CellValue::Number(*i as f64),
            Data::Bool(b) => CellValue::Text(b.to_string()),
            Data::DateTime(dt) => CellValue::Number(dt.as_f64()),
        }
    }

    /// CSV cells are always text; blank text is [`CellValue::Empty`].
    #[must_use]
    pub fn from_text(raw: &str) -> Self {
        if raw.trim().is_empty() {
            CellValue::Empty
        } else {
            CellValue::Text(raw.to_string())
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        match self {
            CellValue::Empty => true,
            CellValue::Text(s) => s.trim().is_empty(),
            CellValue::Number(_) => false,
        }
    }

    /// Quantity reading: blanks, junk, negatives and NaN are 0; fractions are
    /// truncated.
    #[must_use]
    pub fn as_non_negative_int(&self) -> u32 {
        self.as_number().map_or(0, clamp_to_u32)
    }

    /// Like [`CellValue::as_non_negative_int`] but distinguishes "no value".
    #[must_use]
    pub fn as_optional_int(&self) -> Option<u32> {
        self.as_number().map(clamp_to_u32)
    }

    /// Text reading. Whole numbers render without a decimal point so a card
    /// number typed as `1` does not become `"1.0"`.
    #[must_use]
    pub fn as_trimmed_string(&self) -> String {
        match self {
            CellValue::Empty => String::new(),
            CellValue::Text(s) => s.trim().to_string(),
            CellValue::Number(n) if n.is_finite() && n.fract().abs() < f64::EPSILON => {
                #[allow(clippy::cast_possible_truncation)]
                let whole = *n as i64;
                whole.to_string()
            }
            CellValue::Number(n) => n.to_string(),
        }
    }

    fn as_number(&self) -> Option<f64> {
        let n = match self {
            CellValue::Empty => return None,
            CellValue::Number(n) => *n,
            CellValue::Text(s) => s.trim().parse::<f64>().ok()?,
        };
        n.is_finite().then_some(n)
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn clamp_to_u32(n: f64) -> u32 {
    if n <= 0.0 {
        0
    } else {
        n.trunc().min(f64::from(u32::MAX)) as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quantities_are_total() {
        assert_eq!(CellValue::Number(2.0).as_non_negative_int(), 2);
        assert_eq!(CellValue::Number(2.9).as_non_negative_int(), 2);
        assert_eq!(CellValue::Number(-3.0).as_non_negative_int(), 0);
        assert_eq!(CellValue::Number(f64::NAN).as_non_negative_int(), 0);
        assert_eq!(CellValue::Text(" 4 ".into()).as_non_negative_int(), 4);
        assert_eq!(CellValue::Text("x2".into()).as_non_negative_int(), 0);
        assert_eq!(CellValue::Empty.as_non_negative_int(), 0);
    }

    #[test]
    fn optional_int_keeps_absence() {
        assert_eq!(CellValue::Empty.as_optional_int(), None);
        assert_eq!(CellValue::Text("n/a".into()).as_optional_int(), None);
        assert_eq!(CellValue::Number(0.0).as_optional_int(), Some(0));
    }

    #[test]
    fn whole_numbers_render_without_decimal_point() {
        assert_eq!(CellValue::Number(1.0).as_trimmed_string(), "1");
        assert_eq!(CellValue::Number(1.5).as_trimmed_string(), "1.5");
        assert_eq!(CellValue::Text("  SOR ".into()).as_trimmed_string(), "SOR");
    }

    #[test]
    fn calamine_cells_convert() {
        assert_eq!(CellValue::from_calamine(&Data::Int(7)), CellValue::Number(7.0));
        assert_eq!(
            CellValue::from_calamine(&Data::String("   ".into())),
            CellValue::Empty
        );
        assert!(CellValue::from_calamine(&Data::Empty).is_empty());
    }
}
