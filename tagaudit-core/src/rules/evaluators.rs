// Rule evaluators
//
// One function per rule kind. Each takes the current context and the rule's
// parameters and returns a finding line (or, for ConstrainContext, the
// narrowed context). None of them fail on well-formed text; an absent tag is
// a reportable outcome, not an error.

use crate::error::Result;
use crate::patterns::{self, AttributeFilter};
use std::cmp::Ordering;

/// Whether `<tag>` appears anywhere in the context.
pub fn tag_exists(context: &str, tag: &str) -> Result<String> {
    if patterns::closing_pair(tag)?.is_match(context) {
        Ok(format!("{tag} tag is present in the html."))
    } else {
        Ok(format!("{tag} tag does not present in the html."))
    }
}

/// Counts `<tag>` elements without any quoted `attribute` assignment.
pub fn has_no_attr(context: &str, tag: &str, attribute: &str) -> Result<String> {
    let missing = AttributeFilter::absent(tag, attribute)?.count(context);

    if missing > 0 {
        Ok(format!(
            "There are {missing} <{tag}> tags do not contain attribute {attribute}"
        ))
    } else {
        Ok(format!("All existing <{tag}> contain {attribute}."))
    }
}

/// Counts `<tag>` elements where `attribute="value"` is absent.
pub fn has_no_attr_with_value(
    context: &str,
    tag: &str,
    attribute: &str,
    value: &str,
) -> Result<String> {
    let missing = AttributeFilter::mismatched(tag, attribute, value)?.count(context);

    if missing > 0 {
        Ok(format!(
            "There are {missing} <{tag}> tags do not contain attribute {attribute}=\"{value}\""
        ))
    } else {
        Ok(format!(
            "All existing <{tag}> tags contain {attribute}=\"{value}\""
        ))
    }
}

/// Compares the number of `<tag>` elements (paired or self-closing) to `limit`.
pub fn tag_number_greater_than(context: &str, tag: &str, limit: usize) -> Result<String> {
    let count = patterns::closing_pair(tag)?.find_iter(context).count();

    // TODO: singular wording ("exactly 1 <h1> tag") once report consumers stop matching on these strings
    Ok(match count.cmp(&limit) {
        Ordering::Greater => format!("The html has more than {limit} <{tag}> tags"),
        Ordering::Equal => format!("The html has exactly {limit} <{tag}> tags"),
        Ordering::Less => {
            format!("The number of <{tag}> tags in the html is less than the limit {limit}")
        }
    })
}

/// Inner text of the first `<tag>...</tag>` pair, or `None` when there is no
/// such pair. What an absent tag means is decided by the engine.
pub fn constrain_context(context: &str, tag: &str) -> Result<Option<String>> {
    Ok(patterns::inner_content(tag)?
        .captures(context)
        .and_then(|caps| caps.get(1))
        .map(|inner| inner.as_str().to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize::normalize;

    #[test]
    fn test_title_tag_present() {
        let context = normalize(
            "
      <head>
        <title> shop lite </title>
        <h1> shop </h1>
        <h2> great deal </h2>
      </head>
    ",
        );
        assert_eq!(
            tag_exists(&context, "title").unwrap(),
            "title tag is present in the html."
        );
    }

    #[test]
    fn test_title_tag_absent() {
        let context = normalize(
            "
      <head>
        <h1> shop </h1>
        <h2> great deal </h2>
      </head>
    ",
        );
        assert_eq!(
            tag_exists(&context, "title").unwrap(),
            "title tag does not present in the html."
        );
    }

    #[test]
    fn test_counts_img_tags_missing_alt_value() {
        let context = normalize(
            r#"
      <html>
        <img alt="hello world"/>
        <img alt='hello world'/>
        <img src="nihao"/>
        <img alt='hello world' src='nihao'/>
        <img />
      </html>
    "#,
        );
        assert_eq!(
            has_no_attr_with_value(&context, "img", "alt", "hello world").unwrap(),
            "There are 2 <img> tags do not contain attribute alt=\"hello world\""
        );
    }

    #[test]
    fn test_different_value_counts_as_mismatch() {
        let context = r#"<img alt="goodbye"/><img alt="hello world"/>"#;
        assert_eq!(
            has_no_attr_with_value(context, "img", "alt", "hello world").unwrap(),
            "There are 1 <img> tags do not contain attribute alt=\"hello world\""
        );
    }

    #[test]
    fn test_all_img_tags_carry_alt_value() {
        let context = normalize(
            r#"
      <html>
        <img alt="hello world" />
        <img alt="hello world" />
        <img src="http://ab.com/hello.png" alt="hello world" />
        <img alt="hello world" src="http://ab.com/sample.png" />
        <img alt="hello world"src="http://ab.com/sample.png" />
      </html>
    "#,
        );
        assert_eq!(
            has_no_attr_with_value(&context, "img", "alt", "hello world").unwrap(),
            "All existing <img> tags contain alt=\"hello world\""
        );
    }

    #[test]
    fn test_has_no_attr_counts_and_all_present() {
        let context = r#"<a href="/x">x</a><a>y</a><a name='z'>z</a>"#;
        assert_eq!(
            has_no_attr(context, "a", "href").unwrap(),
            "There are 2 <a> tags do not contain attribute href"
        );

        let context = r#"<a href="/x">x</a><a href='/y'>y</a>"#;
        assert_eq!(
            has_no_attr(context, "a", "href").unwrap(),
            "All existing <a> contain href."
        );
    }

    #[test]
    fn test_more_than_limit() {
        let context = normalize(
            "
      <html>
        <h1 />
        <h1 />
        <h1> hello shoppers </h1>
        <div>
          shop
        </div>
      </html>
    ",
        );
        assert_eq!(
            tag_number_greater_than(&context, "h1", 1).unwrap(),
            "The html has more than 1 <h1> tags"
        );
    }

    #[test]
    fn test_exactly_limit_paired_or_self_closing() {
        for h1 in ["<h1> hello shoppers </h1>", "<h1 />", "<h1/>"] {
            let context = format!("<html><div>{h1}</div><div>shop</div></html>");
            assert_eq!(
                tag_number_greater_than(&context, "h1", 1).unwrap(),
                "The html has exactly 1 <h1> tags"
            );
        }
    }

    #[test]
    fn test_less_than_limit() {
        let context = normalize("<html>\n  <div>\n    shop\n  </div>\n</html>");
        assert_eq!(
            tag_number_greater_than(&context, "h1", 1).unwrap(),
            "The number of <h1> tags in the html is less than the limit 1"
        );
    }

    #[test]
    fn test_zero_limit_with_zero_tags_is_exact() {
        assert_eq!(
            tag_number_greater_than("", "h1", 0).unwrap(),
            "The html has exactly 0 <h1> tags"
        );
    }

    #[test]
    fn test_zero_matches_never_fail() {
        assert_eq!(
            has_no_attr("", "img", "alt").unwrap(),
            "All existing <img> contain alt."
        );
        assert_eq!(
            has_no_attr_with_value("<p>text</p>", "img", "alt", "x").unwrap(),
            "All existing <img> tags contain alt=\"x\""
        );
        assert_eq!(
            tag_exists("", "img").unwrap(),
            "img tag does not present in the html."
        );
    }

    #[test]
    fn test_constrain_context() {
        let context = "<head><div><img/></div></head><div>later</div>";
        assert_eq!(
            constrain_context(context, "div").unwrap().as_deref(),
            Some("<img/>")
        );
        assert_eq!(constrain_context(context, "body").unwrap(), None);
        assert_eq!(
            constrain_context("<p></p>", "p").unwrap().as_deref(),
            Some("")
        );
    }
}
