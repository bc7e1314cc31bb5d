use cssparser::{
    AtRuleParser, CowRcStr, DeclarationListParser, DeclarationParser, ParseError, Parser,
    ParserInput,
};

/// An inline style declaration block, e.g. the value of a `style` attribute.
///
/// Declarations keep their insertion order so serialization is stable.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Declarations {
    decls: Vec<(String, String)>,
}

/// Collects each declaration as its name and the verbatim value text.
struct DeclarationCollector;

impl<'i> DeclarationParser<'i> for DeclarationCollector {
    type Declaration = (String, String);
    type Error = ();

    fn parse_value<'t>(
        &mut self,
        name: CowRcStr<'i>,
        input: &mut Parser<'i, 't>,
    ) -> Result<Self::Declaration, ParseError<'i, ()>> {
        let start = input.position();
        while input.next().is_ok() {}
        let value = input.slice_from(start).trim();
        if value.is_empty() {
            return Err(input.new_custom_error(()));
        }
        Ok((name.to_string(), value.to_string()))
    }
}

impl<'i> AtRuleParser<'i> for DeclarationCollector {
    type Prelude = ();
    type AtRule = (String, String);
    type Error = ();
}

impl Declarations {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a declaration list such as `key: value; key2: value2`.
    /// Invalid declarations are skipped; values keep their source text, so
    /// `;` inside strings, `url()` or other blocks survives.
    pub fn parse(style: &str) -> Self {
        let mut out = Declarations::new();
        let mut input = ParserInput::new(style);
        let mut parser = Parser::new(&mut input);
        for (name, value) in DeclarationListParser::new(&mut parser, DeclarationCollector).flatten() {
            out.set(&name, &value);
        }
        out
    }

    pub fn get(&self, property: &str) -> Option<&str> {
        self.decls
            .iter()
            .find(|(k, _)| k == property)
            .map(|(_, v)| v.as_str())
    }

    /// Replace an existing declaration in place or append a new one.
    pub fn set(&mut self, property: &str, value: &str) {
        match self.decls.iter_mut().find(|(k, _)| k == property) {
            Some(slot) => slot.1 = value.to_string(),
            None => self.decls.push((property.to_string(), value.to_string())),
        }
    }

    /// Returns true when something was removed.
    pub fn remove(&mut self, property: &str) -> bool {
        let before = self.decls.len();
        self.decls.retain(|(k, _)| k != property);
        before != self.decls.len()
    }

    pub fn len(&self) -> usize {
        self.decls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.decls.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.decls.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Serialize as `key: value; key2: value2;`.
    pub fn to_css_string(&self) -> String {
        let mut out = String::new();
        for (i, (k, v)) in self.decls.iter().enumerate() {
            if i > 0 {
                out.push(' ');
            }
            out.push_str(k);
            out.push_str(": ");
            out.push_str(v);
            out.push(';');
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_keeps_position() {
        let mut d = Declarations::parse("color: red; top: 1px");
        d.set("color", "blue");
        d.set("left", "2px");
        assert_eq!(d.to_css_string(), "color: blue; top: 1px; left: 2px;");
    }

    #[test]
    fn semicolons_inside_values_stay_put() {
        let d = Declarations::parse(r#"content: "a;b"; color: red"#);
        assert_eq!(d.get("content"), Some(r#""a;b""#));
        assert_eq!(d.to_css_string(), r#"content: "a;b"; color: red;"#);
    }
}
