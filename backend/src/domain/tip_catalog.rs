//! Canned week-by-week health tip texts used by the daily generation pass.
//!
//! Coverage is deliberately uneven: every week of the first trimester
//! through week 6, then the clinically notable milestones. `lookup` is
//! total; any week without a specific entry, including out-of-range
//! input, falls back to the generic wellness tip.

use once_cell::sync::Lazy;
use std::collections::HashMap;

/// A tip title/content pair before it becomes a stored `HealthTip`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TipTemplate {
    pub title: &'static str,
    pub content: &'static str,
}

pub const GENERIC_TIP: TipTemplate = TipTemplate {
    title: "General Pregnancy Wellness",
    content: "Maintain regular prenatal care, eat a balanced diet, stay hydrated, get adequate rest, and don't hesitate to contact your healthcare provider with any concerns.",
};

static CATALOG: Lazy<HashMap<i64, TipTemplate>> = Lazy::new(|| {
    let mut m = HashMap::new();
    // First trimester
    m.insert(1, TipTemplate {
        title: "Welcome to Your Pregnancy Journey",
        content: "Take folic acid supplements, avoid alcohol and smoking, and schedule your first prenatal appointment. Start tracking your symptoms and eat regular, balanced meals.",
    });
    m.insert(2, TipTemplate {
        title: "Early Pregnancy Nutrition",
        content: "Focus on foods rich in folic acid like leafy greens, citrus fruits, and fortified cereals. Stay hydrated and eat small, frequent meals to combat nausea.",
    });
    m.insert(3, TipTemplate {
        title: "Managing Morning Sickness",
        content: "Try eating ginger, keeping crackers by your bedside, and avoiding strong smells. Eat small meals throughout the day and stay hydrated with clear fluids.",
    });
    m.insert(4, TipTemplate {
        title: "First Prenatal Visit Preparation",
        content: "Prepare questions for your doctor, bring your medical history, and discuss any medications you're taking. This is when you'll likely hear your baby's heartbeat for the first time.",
    });
    m.insert(5, TipTemplate {
        title: "Hormone Changes and Your Body",
        content: "Mood swings, breast tenderness, and fatigue are normal. Get plenty of rest, maintain a regular sleep schedule, and don't hesitate to ask for support.",
    });
    m.insert(6, TipTemplate {
        title: "Safe Exercise During Early Pregnancy",
        content: "Light exercises like walking, swimming, and prenatal yoga are beneficial. Avoid contact sports and activities with fall risks. Always consult your doctor before starting new exercises.",
    });
    m.insert(8, TipTemplate {
        title: "Prenatal Vitamins Importance",
        content: "Continue taking prenatal vitamins with folic acid, iron, and calcium. These support your baby's neural tube development and prevent birth defects.",
    });
    m.insert(10, TipTemplate {
        title: "Managing Pregnancy Fatigue",
        content: "Rest when you can, maintain a healthy diet, and don't overexert yourself. Fatigue is your body's way of telling you to slow down and nurture your growing baby.",
    });
    m.insert(12, TipTemplate {
        title: "End of First Trimester",
        content: "Congratulations on reaching 12 weeks! Morning sickness may start to ease, and your energy levels might improve. Continue regular prenatal care.",
    });
    // Second trimester
    m.insert(14, TipTemplate {
        title: "Second Trimester Energy Boost",
        content: "Many women feel more energetic now. This is a great time to prepare the nursery, take childbirth classes, and enjoy your pregnancy glow.",
    });
    m.insert(16, TipTemplate {
        title: "Feeling Baby's First Movements",
        content: "You might start feeling gentle flutters or bubbles. These movements will become stronger over time. Track your baby's activity patterns.",
    });
    m.insert(18, TipTemplate {
        title: "Anatomy Scan Preparation",
        content: "Around this time, you'll have an anatomy scan to check your baby's development. This is often when you can learn your baby's sex if you choose.",
    });
    m.insert(20, TipTemplate {
        title: "Halfway Point Celebration",
        content: "You're halfway through your pregnancy! Focus on a balanced diet with extra protein and calcium. Your baby is now about the size of a banana.",
    });
    m.insert(22, TipTemplate {
        title: "Skin and Hair Changes",
        content: "Pregnancy hormones may cause skin darkening or hair changes. Use gentle, fragrance-free products and always wear sunscreen when outdoors.",
    });
    m.insert(24, TipTemplate {
        title: "Viability Milestone",
        content: "Your baby has reached an important milestone! Continue regular prenatal visits and monitor your baby's movements. Start thinking about birth preferences.",
    });
    m.insert(26, TipTemplate {
        title: "Preparing for Third Trimester",
        content: "Begin thinking about your birth plan, tour the maternity ward, and consider taking breastfeeding classes. Monitor for signs of preterm labor.",
    });
    // Third trimester
    m.insert(28, TipTemplate {
        title: "Welcome to Third Trimester",
        content: "You're in the final stretch! Visits become more frequent now. Watch for signs of preeclampsia: severe headaches, vision changes, or sudden swelling.",
    });
    m.insert(30, TipTemplate {
        title: "Baby's Rapid Growth",
        content: "Your baby is gaining weight rapidly. You might experience shortness of breath as your baby grows. Practice relaxation techniques and prenatal breathing exercises.",
    });
    m.insert(32, TipTemplate {
        title: "Getting Ready for Baby",
        content: "Prepare your hospital bag, install the car seat, and finalize your birth plan. Start practicing perineal massage to help prepare for delivery.",
    });
    m.insert(34, TipTemplate {
        title: "Monitoring Baby's Movements",
        content: "Pay attention to your baby's movement patterns. You should feel at least 10 movements in 2 hours. Contact your healthcare provider if movements decrease significantly.",
    });
    m.insert(36, TipTemplate {
        title: "Baby is Considered Full-Term Soon",
        content: "Your baby's lungs are maturing. Practice your breathing techniques, finish any last-minute preparations, and rest as much as possible.",
    });
    m.insert(37, TipTemplate {
        title: "Full-Term Pregnancy",
        content: "Your baby is now considered full-term! Labor could start any time. Know the signs of labor and when to contact your healthcare provider.",
    });
    m.insert(38, TipTemplate {
        title: "Final Preparations",
        content: "Double-check your hospital bag, confirm your birth plan with your healthcare team, and ensure you have reliable transportation to the hospital.",
    });
    m.insert(39, TipTemplate {
        title: "Signs of Labor",
        content: "Watch for regular contractions, water breaking, or bloody show. Time contractions and contact your healthcare provider when they're 5 minutes apart for 1 hour.",
    });
    m.insert(40, TipTemplate {
        title: "Your Due Date",
        content: "You've reached your due date! Only 5% of babies are born on their exact due date. Stay calm, rest when possible, and trust your body's process.",
    });
    m.insert(41, TipTemplate {
        title: "Post-Due Date Monitoring",
        content: "Your healthcare provider will monitor you and your baby closely. Non-stress tests and fluid checks help ensure your baby's well-being.",
    });
    m.insert(42, TipTemplate {
        title: "Extended Pregnancy",
        content: "Your healthcare provider may discuss induction options. Continue monitoring baby's movements and attend all scheduled appointments.",
    });
    m
});

/// Look up the tip for a gestational week. Total over all integers:
/// weeks without a specific entry get the generic wellness tip.
pub fn lookup(week: i64) -> &'static TipTemplate {
    CATALOG.get(&week).unwrap_or(&GENERIC_TIP)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_specific_weeks() {
        assert_eq!(lookup(1).title, "Welcome to Your Pregnancy Journey");
        assert_eq!(lookup(20).title, "Halfway Point Celebration");
        assert_eq!(lookup(40).title, "Your Due Date");
        assert_eq!(lookup(42).title, "Extended Pregnancy");
    }

    #[test]
    fn test_lookup_gap_weeks_fall_back() {
        // Weeks without a dedicated entry
        assert_eq!(lookup(7).title, GENERIC_TIP.title);
        assert_eq!(lookup(13).title, GENERIC_TIP.title);
        assert_eq!(lookup(35).title, GENERIC_TIP.title);
    }

    #[test]
    fn test_lookup_is_total() {
        for week in [-100, -1, 0, 43, 100, 10_000, i64::MIN, i64::MAX] {
            let tip = lookup(week);
            assert!(!tip.title.is_empty());
            assert!(!tip.content.is_empty());
        }
    }

    #[test]
    fn test_every_entry_within_tracked_range() {
        for week in CATALOG.keys() {
            assert!((1..=42).contains(week));
        }
    }
}
