pub mod aggregate;
pub mod category;

pub use aggregate::{
    CreateLinkDto, DisplayType, Link, LinkGroupsResponse, LinkListResponse, ReorderLinksDto,
    UpdateLinkDto,
};
pub use category::{group_links, CategoryGroup, CategoryPath, CategoryRoots, SubCategoryGroup};
