use rdf_transform_model::ResourcePath;

/// The path segment that addresses the transforms of a resource.
pub const TRANSFORM_SEGMENT: &str = "fcr:transform";

/// What a request path addresses.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RequestTarget {
    /// A resource description or, below the configuration root, a program.
    Resource(ResourcePath),
    /// `<resource>/fcr:transform` (inline) or `<resource>/fcr:transform/<key>` (stored).
    Transform {
        resource: ResourcePath,
        key: Option<String>,
    },
}

impl RequestTarget {
    /// Splits a request path at its `fcr:transform` segment.
    ///
    /// Returns `None` if more than one segment follows `fcr:transform`.
    pub fn parse(path: &str) -> Option<Self> {
        let segments = path.split('/').filter(|s| !s.is_empty()).collect::<Vec<_>>();
        let Some(position) = segments.iter().position(|s| *s == TRANSFORM_SEGMENT) else {
            return Some(Self::Resource(ResourcePath::new(path)));
        };

        let (resource, rest) = segments.split_at(position);
        let resource = ResourcePath::new(resource.join("/"));
        match rest {
            [_] => Some(Self::Transform {
                resource,
                key: None,
            }),
            [_, key] => Some(Self::Transform {
                resource,
                key: Some((*key).to_owned()),
            }),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_request_paths() {
        assert_eq!(
            RequestTarget::parse("collection/a"),
            Some(RequestTarget::Resource(ResourcePath::new("/collection/a")))
        );
        assert_eq!(
            RequestTarget::parse("collection/a/fcr:transform/default"),
            Some(RequestTarget::Transform {
                resource: ResourcePath::new("/collection/a"),
                key: Some("default".to_owned()),
            })
        );
        assert_eq!(
            RequestTarget::parse("fcr:transform"),
            Some(RequestTarget::Transform {
                resource: ResourcePath::new("/"),
                key: None,
            })
        );
        assert_eq!(RequestTarget::parse("a/fcr:transform/default/more"), None);
    }
}
