//! Static lookup of doctype declaration strings by output format and subtype.

use crate::Format;

/// Returns the doctype declaration for the given format and subtype.
///
/// An empty subtype selects the format's default, which is `transitional`
/// for `xhtml` and `html4`.
pub fn lookup(format: Format, subtype: &str) -> Option<&'static str> {
    let decl = match format {
        Format::Xhtml => match subtype {
            "strict" => {
                "<!DOCTYPE html PUBLIC \"-//W3C//DTD XHTML 1.0 Strict//EN\" \
                 \"http://www.w3.org/TR/xhtml1/DTD/xhtml1-strict.dtd\">"
            }
            "" | "transitional" => {
                "<!DOCTYPE html PUBLIC \"-//W3C//DTD XHTML 1.0 Transitional//EN\" \
                 \"http://www.w3.org/TR/xhtml1/DTD/xhtml1-transitional.dtd\">"
            }
            "basic" => {
                "<!DOCTYPE html PUBLIC \"-//W3C//DTD XHTML Basic 1.1//EN\" \
                 \"http://www.w3.org/TR/xhtml-basic/xhtml-basic11.dtd\">"
            }
            "mobile" => {
                "<!DOCTYPE html PUBLIC \"-//WAPFORUM//DTD XHTML Mobile 1.2//EN\" \
                 \"http://www.openmobilealliance.org/tech/DTD/xhtml-mobile12.dtd\">"
            }
            "frameset" => {
                "<!DOCTYPE html PUBLIC \"-//W3C//DTD XHTML 1.0 Frameset//EN\" \
                 \"http://www.w3.org/TR/xhtml1/DTD/xhtml1-frameset.dtd\">"
            }
            _ => return None,
        },
        Format::Html4 => match subtype {
            "strict" => {
                "<!DOCTYPE html PUBLIC \"-//W3C//DTD HTML 4.01//EN\" \
                 \"http://www.w3.org/TR/html4/strict.dtd\">"
            }
            "frameset" => {
                "<!DOCTYPE html PUBLIC \"-//W3C//DTD HTML 4.01 Frameset//EN\" \
                 \"http://www.w3.org/TR/html4/frameset.dtd\">"
            }
            "" | "transitional" => {
                "<!DOCTYPE html PUBLIC \"-//W3C//DTD HTML 4.01 Transitional//EN\" \
                 \"http://www.w3.org/TR/html4/loose.dtd\">"
            }
            _ => return None,
        },
        Format::Html5 => match subtype {
            "" => "<!DOCTYPE html>",
            _ => return None,
        },
    };
    Some(decl)
}

/// Returns the XML prolog for the given charset.
pub fn xml_prolog(charset: &str) -> String {
    format!("<?xml version=\"1.0\" encoding=\"{charset}\"?>")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn html5_default() {
        assert_eq!(lookup(Format::Html5, ""), Some("<!DOCTYPE html>"));
        assert_eq!(lookup(Format::Html5, "strict"), None);
    }

    #[test]
    fn xhtml_strict() {
        assert_eq!(
            lookup(Format::Xhtml, "strict"),
            Some(
                "<!DOCTYPE html PUBLIC \"-//W3C//DTD XHTML 1.0 Strict//EN\" \
                 \"http://www.w3.org/TR/xhtml1/DTD/xhtml1-strict.dtd\">"
            )
        );
    }

    #[test]
    fn defaults_are_transitional() {
        assert_eq!(lookup(Format::Xhtml, ""), lookup(Format::Xhtml, "transitional"));
        assert_eq!(lookup(Format::Html4, ""), lookup(Format::Html4, "transitional"));
    }

    #[test]
    fn unknown_subtype() {
        assert_eq!(lookup(Format::Xhtml, "bogus"), None);
    }

    #[test]
    fn prolog() {
        assert_eq!(
            xml_prolog("utf-8"),
            "<?xml version=\"1.0\" encoding=\"utf-8\"?>"
        );
    }
}
