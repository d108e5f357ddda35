// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! # Ordo Lanes
//!
//! The hot path of the pipeline. Each frame, cullable objects are rewritten
//! for their transparency mode, sorted into bins registered with the
//! [`CullBinManager`], sorted per bin at the end of cull, and drawn bin by
//! bin in the manager's draw order.

#![warn(missing_docs)]

pub mod cull_lane;

pub use self::cull_lane::{
    Admission, AdmissionHandle, BinCache, CullBin, CullBinManager, CullResult, CullableObject,
};
