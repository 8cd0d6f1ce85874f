pub mod check;
pub mod setup;
pub mod subscriptions;

use nr_lambda_core::SUPPORTED_REGIONS;

/// Regions to operate on: the user's list, or every supported region.
pub(crate) fn resolve_regions(regions: &[String]) -> Vec<String> {
    if regions.is_empty() {
        SUPPORTED_REGIONS.iter().map(|r| r.to_string()).collect()
    } else {
        regions.to_vec()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_region_list_means_all_supported() {
        assert_eq!(resolve_regions(&[]).len(), SUPPORTED_REGIONS.len());

        let explicit = ["us-east-1".to_string()];
        assert_eq!(resolve_regions(&explicit), explicit);
    }
}
