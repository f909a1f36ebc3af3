//! Bean resolution against session state.

use mbean_run_core::{BeanResolver, ObjectName};

/// The bean and domain an interactive session currently points at.
///
/// Resolution rules for `(bean, domain)`:
/// - no bean: the session's current bean;
/// - a bean containing `:` is already fully qualified;
/// - otherwise the bean is prefixed with the given domain, falling back to
///   the session's domain, and used as-is when neither is set.
#[derive(Debug, Clone, Default)]
pub struct SessionBeans {
    bean: Option<String>,
    domain: Option<String>,
}

impl SessionBeans {
    /// Session pointing at `bean`.
    #[must_use]
    pub fn with_bean(bean: impl Into<String>) -> Self {
        Self {
            bean: Some(bean.into()),
            domain: None,
        }
    }

    /// Current bean.
    #[must_use]
    pub fn bean(&self) -> Option<&str> {
        self.bean.as_deref()
    }

    /// Current domain.
    #[must_use]
    pub fn domain(&self) -> Option<&str> {
        self.domain.as_deref()
    }

    /// Point the session at another bean.
    pub fn set_bean(&mut self, bean: Option<String>) {
        self.bean = bean;
    }

    /// Change the session's default domain.
    pub fn set_domain(&mut self, domain: Option<String>) {
        self.domain = domain;
    }
}

impl BeanResolver for SessionBeans {
    fn resolve(&self, bean: Option<&str>, domain: Option<&str>) -> Option<ObjectName> {
        let Some(bean) = bean else {
            return self.bean.as_deref().map(ObjectName::from);
        };
        if bean.contains(':') {
            return Some(ObjectName::from(bean));
        }
        let name = match domain.or(self.domain.as_deref()) {
            Some(domain) => format!("{domain}:{bean}"),
            None => bean.to_string(),
        };
        Some(ObjectName::from(name))
    }
}
