// Text normalization
//
// Collapses a raw document into a single line so that tag patterns never have
// to deal with indentation or line breaks.

/// Strip leading whitespace from every line and drop all CR/LF characters.
///
/// The output contains no line breaks and never starts with whitespace, so
/// `normalize(&normalize(s)) == normalize(s)` for every input.
pub fn normalize(raw: &str) -> String {
    raw.split(['\r', '\n'])
        .map(str::trim_start)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEAD: &str = "
    <head>
      <title> shop lite </title>
      <h1> shop </h1>
      <h2> great deal </h2>
    </head>
  ";

    #[test]
    fn test_removes_indentation_and_line_breaks() {
        assert_eq!(
            normalize(HEAD),
            "<head><title> shop lite </title><h1> shop </h1><h2> great deal </h2></head>"
        );
    }

    #[test]
    fn test_handles_all_line_break_styles() {
        assert_eq!(normalize("<a>\r\n  <b>\r\t<c>\n<d>"), "<a><b><c><d>");
    }

    #[test]
    fn test_keeps_trailing_and_inner_whitespace() {
        assert_eq!(normalize("  <p> a  b </p>  \n  x"), "<p> a  b </p>  x");
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(normalize(""), "");
        assert_eq!(normalize("\r\n\n  \r"), "");
    }

    #[test]
    fn test_idempotent() {
        let samples = [
            HEAD,
            "",
            "   leading",
            "\n \n  <img />\r\n\t<img alt='x'/>  ",
            "no breaks at all",
            " \u{a0}<p>\u{a0}</p>\n",
        ];
        for sample in samples {
            let once = normalize(sample);
            assert_eq!(normalize(&once), once, "not idempotent for {sample:?}");
        }
    }
}
