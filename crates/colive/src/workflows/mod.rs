pub mod applications;
pub mod onboarding;
pub mod payments;
pub mod requests;
pub mod todos;
