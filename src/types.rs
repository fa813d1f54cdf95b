multiversx_sc::imports!();
multiversx_sc::derive_imports!();

// ============================================================
// Proposal Status — lifecycle states
// ============================================================

#[type_abi]
#[derive(TopEncode, TopDecode, NestedEncode, NestedDecode, Clone, Copy, PartialEq, Debug)]
pub enum ProposalStatus {
    /// In the queue, awaiting its voting window and processing.
    Submitted,
    /// Tallied and resolved. Terminal state; see `Proposal::passed`.
    Processed,
    /// Withdrawn by the applicant before voting began. Terminal state.
    Aborted,
}

// ============================================================
// Vote — write-once per member per proposal
// ============================================================

#[type_abi]
#[derive(TopEncode, TopDecode, NestedEncode, NestedDecode, Clone, Copy, PartialEq, Debug)]
pub enum Vote {
    /// Reserved zero discriminant, never a valid ballot. The codec
    /// top-encodes discriminant 0 as an empty buffer, so a cast ballot
    /// must sit at a nonzero discriminant to be distinguishable from
    /// an empty storage entry.
    Null,
    Yes,
    No,
}

// ============================================================
// Proposal — the core governance record
// ============================================================

#[type_abi]
#[derive(TopEncode, TopDecode, NestedEncode, NestedDecode, Clone, Debug)]
pub struct Proposal<M: ManagedTypeApi> {
    /// The member who submitted the proposal and paid the deposit.
    pub proposer: ManagedAddress<M>,
    /// The account requesting membership; receives shares on a pass
    /// and the tribute refund on a fail or abort.
    pub applicant: ManagedAddress<M>,
    pub shares_requested: BigUint<M>,
    /// First period in which this proposal can be voted on. Strictly
    /// increasing across the queue.
    pub starting_period: u64,
    pub yes_votes: BigUint<M>,
    pub no_votes: BigUint<M>,
    pub status: ProposalStatus,
    /// Set at processing time; meaningless while status is Submitted.
    pub passed: bool,
    /// Tokens held in escrow for the applicant until resolution.
    pub token_tribute: BigUint<M>,
    pub details: ManagedBuffer<M>,
    /// Highest total shares outstanding seen at any yes vote; input to
    /// the dilution-bound check at processing time.
    pub max_total_shares_at_yes_vote: BigUint<M>,
}

// ============================================================
// Member — never deleted, zero-share members remain on record
// ============================================================

#[type_abi]
#[derive(TopEncode, TopDecode, NestedEncode, NestedDecode, Clone, Debug)]
pub struct Member<M: ManagedTypeApi> {
    /// Address authorized to submit proposals and vote on this
    /// member's behalf. Defaults to the member's own address.
    pub delegate_key: ManagedAddress<M>,
    pub shares: BigUint<M>,
    /// Highest proposal index this member voted yes on. Blocks
    /// rage-quit until that proposal is resolved.
    pub highest_index_yes_vote: u64,
}
