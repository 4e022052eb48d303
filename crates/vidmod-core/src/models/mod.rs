pub mod job;
pub mod organization;
pub mod pagination;
pub mod role;
pub mod user;
pub mod video;

pub use job::{JobStatus, ProcessingJob};
pub use organization::{
    slugify, MemberRole, NewOrganization, Organization, OrganizationMember, OrganizationSettings,
    Subscription, SubscriptionPlan, SubscriptionStatus,
};
pub use pagination::{PageQuery, Pagination};
pub use role::{Permission, Role, RoleName};
pub use user::{normalize_email, NewUser, User, UserResponse};
pub use video::{
    parse_tags, DetectedContent, ModerationStatus, NewVideo, ProcessingOutcome,
    SensitivityAnalysis, Video, VideoMetadata, VideoStatus, VideoUpdate,
};
