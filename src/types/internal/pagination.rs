/// Normalized page request for list endpoints
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    /// 1-based page number
    pub page: u64,
    pub limit: u64,
}

impl PageRequest {
    pub const DEFAULT_LIMIT: u64 = 20;
    pub const MAX_LIMIT: u64 = 100;

    /// Clamp raw query values into a usable page request
    pub fn new(page: Option<u64>, limit: Option<u64>) -> Self {
        let page = page.filter(|p| *p > 0).unwrap_or(1);
        let limit = limit
            .filter(|l| *l > 0)
            .unwrap_or(Self::DEFAULT_LIMIT)
            .min(Self::MAX_LIMIT);
        Self { page, limit }
    }

    /// Zero-based page index as used by sea-orm paginators
    pub fn index(&self) -> u64 {
        self.page - 1
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::new(None, None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_and_clamping() {
        assert_eq!(PageRequest::new(None, None), PageRequest { page: 1, limit: 20 });
        assert_eq!(PageRequest::new(Some(0), Some(0)), PageRequest { page: 1, limit: 20 });
        assert_eq!(PageRequest::new(Some(3), Some(500)).limit, 100);
        assert_eq!(PageRequest::new(Some(3), Some(10)).index(), 2);
    }
}
