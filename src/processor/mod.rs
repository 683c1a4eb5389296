pub mod extract;
pub mod load;
pub mod notify;
pub mod pipeline;
pub mod regions;
pub mod transform;
pub mod validator;
