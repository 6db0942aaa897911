//! Option lists of the choice parameters.
//!
//! A choice parameter stores the *index* of the selected option, so variant
//! order is part of the persisted contract.

use serde::{Deserialize, Serialize};

macro_rules! choice_enum {
    (
        $(#[$meta:meta])*
        $name:ident default $default:ident {
            $($(#[$vmeta:meta])* $variant:ident => $label:literal),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(rename_all = "snake_case")]
        pub enum $name {
            $($(#[$vmeta])* $variant),+
        }

        impl $name {
            /// Every option in host order.
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            /// Label shown in the host's option menu.
            pub fn label(self) -> &'static str {
                match self {
                    $($name::$variant => $label),+
                }
            }

            /// Option labels in host order.
            pub fn labels() -> Vec<&'static str> {
                Self::ALL.iter().map(|c| c.label()).collect()
            }

            pub fn index(self) -> usize {
                self as usize
            }

            pub fn from_index(index: usize) -> Option<Self> {
                Self::ALL.get(index).copied()
            }
        }

        impl Default for $name {
            fn default() -> Self {
                $name::$default
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.label())
            }
        }
    };
}

choice_enum! {
    /// Describer types used to localize.
    FeaturesType default Sift {
        Sift => "SIFT",
        CcTag3 => "CCTAG3",
        CcTag4 => "CCTAG4",
        SiftCcTag3 => "SIFT_CCTAG3",
        SiftCcTag4 => "SIFT_CCTAG4",
    }
}

impl FeaturesType {
    pub fn uses_sift(self) -> bool {
        matches!(
            self,
            FeaturesType::Sift | FeaturesType::SiftCcTag3 | FeaturesType::SiftCcTag4
        )
    }

    pub fn uses_cctag(self) -> bool {
        !matches!(self, FeaturesType::Sift)
    }
}

choice_enum! {
    /// Extractor density preset (speed/quality trade-off).
    FeaturesPreset default Normal {
        Low => "Low",
        Medium => "Medium",
        Normal => "Normal",
        High => "High",
        Ultra => "Ultra",
    }
}

choice_enum! {
    /// Whether the relative poses of the rig cameras are known.
    RigMode default Unknown {
        Unknown => "Unknown",
        Known => "Known",
    }
}

choice_enum! {
    FocalLengthMode default Known {
        Known => "Known",
        /// Used as an initial guess and refined.
        Initial => "Initial",
        Unknown => "Unknown",
    }
}

choice_enum! {
    /// Calibration status of the lens distortion.
    LensDistortion default Known {
        Known => "Known",
        Initial => "Initial",
        Unknown => "Unknown",
    }
}

choice_enum! {
    LensDistortionModel default Radial3 {
        Radial1 => "Radial1",
        Radial3 => "Radial3",
        /// Two radial plus two tangential coefficients.
        Brown => "Brown",
        Fisheye4 => "Fisheye4",
    }
}

impl LensDistortionModel {
    /// Number of leading distortion coefficients the model reads.
    pub fn coefficient_count(self) -> usize {
        match self {
            LensDistortionModel::Radial1 => 1,
            LensDistortionModel::Radial3 => 3,
            LensDistortionModel::Brown | LensDistortionModel::Fisheye4 => 4,
        }
    }
}

choice_enum! {
    /// Localization strategy over the retrieved database images.
    Algorithm default AllResults {
        /// Stop at the first image that yields a pose.
        FirstBest => "FirstBest",
        /// Keep the image with the most resection inliers.
        BestResult => "BestResult",
        /// Merge matches of all retrieved images.
        AllResults => "AllResults",
        Cluster => "Cluster",
    }
}

impl Algorithm {
    /// Whether the `max results` cutoff applies.
    pub fn uses_max_results(self) -> bool {
        matches!(self, Algorithm::AllResults)
    }
}

choice_enum! {
    /// Robust estimator for matching and resection.
    Estimator default AcRansac {
        AcRansac => "ACRansac",
        Ransac => "Ransac",
        LoRansac => "LORansac",
    }
}

impl Estimator {
    /// A zero threshold lets the estimator pick one, which only AC-RANSAC can.
    pub fn supports_auto_threshold(self) -> bool {
        matches!(self, Estimator::AcRansac)
    }
}

choice_enum! {
    TrackingRangeMode default Timeline {
        Timeline => "Timeline",
        Custom => "Custom",
    }
}
