//! Assembly identity: names, versions and strong names as shown in header blocks.

pub use assembly::{AssemblyIdentity, AssemblyVersion, StrongName};

mod assembly;
