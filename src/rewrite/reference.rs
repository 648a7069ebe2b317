/// A URL-like reference split into its path, query string and fragment.
///
/// `query` keeps its leading `?` and `fragment` its leading `#`, so joining the three parts
/// reproduces the original text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReferenceParts<'a> {
  /// Everything before the query string or fragment.
  pub path: &'a str,
  /// Query string including `?`, or empty.
  pub query: &'a str,
  /// Fragment including `#`, or empty.
  pub fragment: &'a str,
}

impl<'a> ReferenceParts<'a> {
  /// Split `reference`. A `?` after the first `#` belongs to the fragment.
  pub fn parse(reference: &'a str) -> Self {
    let (before_fragment, fragment) = match reference.find('#') {
      Some(index) => reference.split_at(index),
      None => (reference, ""),
    };
    let (path, query) = match before_fragment.find('?') {
      Some(index) => before_fragment.split_at(index),
      None => (before_fragment, ""),
    };

    Self {
      path,
      query,
      fragment,
    }
  }

  /// Join `path` with this reference's query string and fragment.
  pub fn with_path(&self, path: &str) -> String {
    format!("{path}{}{}", self.query, self.fragment)
  }
}
