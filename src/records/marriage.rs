//! Married-in classification
//!
//! Decides whether a member joined the family by partnership rather than
//! birth. Married-in members are rendered beside their blood-line partner
//! instead of being placed as a root or as a child.
//!
//! A member is married-in when it has a resolvable partner (not itself) and
//! one of the following holds:
//!
//! 1. the member has no resolvable parent while the partner has one;
//! 2. neither has a resolvable parent and the partner is a founder while the
//!    member is not (two founders: the later record is married-in);
//! 3. both name the same resolvable parent, that parent is in the partner's
//!    branch, and the member is the one without a spouse declaration of its
//!    own. When both declare, the later-born (then the greater id) is
//!    married-in. This sibling pattern is malformed data and is reported by
//!    the diagnostics pass for manual review.

use std::cmp::Ordering;

use family_types::Member;

use super::index::{RecordIndex, SpouseLinks};

/// Which rule classified a member as married-in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarriedInReason {
    /// Partner has a recorded parent, the member does not
    NoParent,
    /// Spouse of a founder
    FounderSpouse,
    /// Same-parent spouse pair
    SiblingPair,
}

/// Married-in classifier over one set of spouse links
#[derive(Debug, Clone, Copy)]
pub struct MarriageResolver<'a> {
    index: &'a RecordIndex,
    links: &'a SpouseLinks,
}

impl<'a> MarriageResolver<'a> {
    /// Classify against the global spouse links
    pub fn new(index: &'a RecordIndex) -> Self {
        Self {
            index,
            links: index.spouse_links(),
        }
    }

    /// Classify against branch-local links
    pub fn with_links(index: &'a RecordIndex, links: &'a SpouseLinks) -> Self {
        Self { index, links }
    }

    /// Resolvable partner of a member, never the member itself
    pub fn partner_of(&self, member: &Member) -> Option<&'a Member> {
        self.links
            .partner(member.id.as_str())
            .and_then(|id| self.index.get(id.as_str()))
            .filter(|partner| partner.id != member.id)
    }

    pub fn is_married_in(&self, member: &Member) -> bool {
        self.married_in_reason(member).is_some()
    }

    /// The rule that makes `member` married-in, if any
    pub fn married_in_reason(&self, member: &Member) -> Option<MarriedInReason> {
        let partner = self.partner_of(member)?;
        let own_parent = self.index.parent_of(member);
        let partner_parent = self.index.parent_of(partner);

        match (own_parent, partner_parent) {
            (None, Some(_)) => Some(MarriedInReason::NoParent),
            (None, None) => self
                .founder_spouse(member, partner)
                .then_some(MarriedInReason::FounderSpouse),
            (Some(parent), Some(_)) => self
                .sibling_married_in(member, partner, parent)
                .then_some(MarriedInReason::SiblingPair),
            (Some(_), None) => None,
        }
    }

    /// Partner to render beside `member`: only a partner that is married-in
    pub fn attached_partner(&self, member: &Member) -> Option<&'a Member> {
        self.partner_of(member)
            .filter(|partner| self.is_married_in(partner))
    }

    /// Whether `member` and its partner share the same resolvable parent
    pub fn is_sibling_pair(&self, member: &Member) -> bool {
        match (self.partner_of(member), self.index.parent_of(member)) {
            (Some(partner), Some(_)) => partner.parent_id == member.parent_id,
            _ => false,
        }
    }

    fn founder_spouse(&self, member: &Member, partner: &Member) -> bool {
        match (member.is_founder(), partner.is_founder()) {
            (false, true) => true,
            (true, true) => {
                let own = self.index.position(member.id.as_str());
                let other = self.index.position(partner.id.as_str());
                own > other
            }
            _ => false,
        }
    }

    fn sibling_married_in(&self, member: &Member, partner: &Member, parent: &Member) -> bool {
        if member.parent_id != partner.parent_id || parent.branch() != partner.branch() {
            return false;
        }

        match (member.spouse_id.is_some(), partner.spouse_id.is_some()) {
            (false, _) => true,
            (true, false) => false,
            (true, true) => later_born(member, partner) == Ordering::Greater,
        }
    }
}

/// Orders by birth date with missing dates last, then by id
fn later_born(a: &Member, b: &Member) -> Ordering {
    let by_date = match (&a.birth_date, &b.birth_date) {
        (Some(x), Some(y)) => x.cmp(y),
        (None, Some(_)) => Ordering::Greater,
        (Some(_), None) => Ordering::Less,
        (None, None) => Ordering::Equal,
    };
    by_date.then_with(|| a.id.cmp(&b.id))
}
