#![no_std]

multiversx_sc::imports!();

pub mod types;

use types::{Member, Proposal, ProposalStatus, Vote};

// ============================================================
// Contract
// ============================================================

#[multiversx_sc::contract]
pub trait MolochDao {
    // ========================================================
    // Init / Upgrade
    // ========================================================

    /// Summons the DAO. The caller becomes the first member with a
    /// single share and their own address as delegate key. All
    /// configuration is fixed here and never mutated afterwards.
    #[init]
    fn init(
        &self,
        approved_token: TokenIdentifier,
        period_duration: u64,
        voting_period_length: u64,
        grace_period_length: u64,
        proposal_deposit: BigUint,
        dilution_bound: BigUint,
        processing_reward: BigUint,
        allow_zero_payout: bool,
    ) {
        require!(
            approved_token.is_valid_esdt_identifier(),
            "Approved token must be a valid ESDT identifier"
        );
        require!(period_duration > 0, "Period duration must be greater than 0");
        require!(
            voting_period_length > 0,
            "Voting period length must be greater than 0"
        );
        require!(dilution_bound > 0u64, "Dilution bound cannot be 0");
        require!(
            proposal_deposit >= processing_reward,
            "Proposal deposit cannot be smaller than the processing reward"
        );

        self.approved_token().set(&approved_token);
        self.period_duration().set(period_duration);
        self.voting_period_length().set(voting_period_length);
        self.grace_period_length().set(grace_period_length);
        self.proposal_deposit().set(&proposal_deposit);
        self.dilution_bound().set(&dilution_bound);
        self.processing_reward().set(&processing_reward);
        self.allow_zero_payout().set(allow_zero_payout);
        self.summoning_time()
            .set(self.blockchain().get_block_timestamp());

        let summoner = self.blockchain().get_caller();
        self.members(&summoner).set(&Member {
            delegate_key: summoner.clone(),
            shares: BigUint::from(1u64),
            highest_index_yes_vote: 0,
        });
        self.members_by_delegate_key(&summoner).set(&summoner);
        self.total_shares().set(BigUint::from(1u64));

        self.summon_event(&summoner);
    }

    #[upgrade]
    fn upgrade(&self) {}

    // ========================================================
    // ENDPOINT: depositEscrow
    // Transfer-and-notify entry point of the token ledger: the
    // attached payment of the approved token is credited to the
    // sender's escrow balance, from which proposal deposits and
    // tributes are later pulled.
    // ========================================================

    #[payable("*")]
    #[endpoint(depositEscrow)]
    fn deposit_escrow(&self) {
        let (token_id, amount) = self.call_value().single_fungible_esdt();
        require!(token_id == self.approved_token().get(), "Unsupported token");
        require!(amount > 0u64, "Deposit must be greater than zero");

        let caller = self.blockchain().get_caller();
        self.escrow_credit(&caller, &amount);

        self.escrow_deposit_event(&caller, &amount);
    }

    // ========================================================
    // ENDPOINT: sendApplicantTribute
    // Lets a sponsor fund an applicant's tribute out of their own
    // escrow balance before submitting the proposal.
    // ========================================================

    #[endpoint(sendApplicantTribute)]
    fn send_applicant_tribute(&self, applicant: ManagedAddress, amount: BigUint) {
        require!(!applicant.is_zero(), "Applicant cannot be the zero address");
        require!(amount > 0u64, "Amount must be greater than zero");

        let caller = self.blockchain().get_caller();
        self.escrow_debit(&caller, &amount);
        self.escrow_credit(&applicant, &amount);

        self.tribute_sent_event(&caller, &applicant, &amount);
    }

    // ========================================================
    // ENDPOINT: submitProposal
    // Members (through their delegate key) propose a new applicant.
    // The proposal deposit is pulled from the member's escrow and
    // the tribute from the applicant's escrow; both stay locked
    // until the proposal is processed or aborted.
    // ========================================================

    #[endpoint(submitProposal)]
    fn submit_proposal(
        &self,
        applicant: ManagedAddress,
        token_tribute: BigUint,
        shares_requested: BigUint,
        details: ManagedBuffer,
    ) -> u64 {
        let member_id = self.only_delegate();

        require!(
            !applicant.is_zero() && applicant != self.blockchain().get_sc_address(),
            "Applicant must not be the contract or the zero address"
        );

        self.total_shares_requested()
            .update(|total| *total += &shares_requested);

        // Both pulls revert the whole call if underfunded, so a failed
        // submission leaves no partial debit.
        self.escrow_debit(&member_id, &self.proposal_deposit().get());
        self.escrow_debit(&applicant, &token_tribute);

        // Voting windows may not overlap ambiguously: each proposal
        // starts one period after the later of "now" and the previous
        // proposal's start.
        let queue_length = self.proposal_queue_length().get();
        let period_based_on_queue = if queue_length > 0 {
            self.proposals(queue_length - 1).get().starting_period
        } else {
            0
        };
        let starting_period =
            core::cmp::max(self.get_current_period(), period_based_on_queue) + 1;

        let proposal = Proposal {
            proposer: member_id.clone(),
            applicant: applicant.clone(),
            shares_requested: shares_requested.clone(),
            starting_period,
            yes_votes: BigUint::zero(),
            no_votes: BigUint::zero(),
            status: ProposalStatus::Submitted,
            passed: false,
            token_tribute: token_tribute.clone(),
            details,
            max_total_shares_at_yes_vote: BigUint::zero(),
        };
        let proposal_index = queue_length;
        self.proposals(proposal_index).set(&proposal);
        self.proposal_queue_length().set(queue_length + 1);

        self.proposal_submitted_event(
            proposal_index,
            &member_id,
            &applicant,
            &token_tribute,
            &shares_requested,
        );

        proposal_index
    }

    // ========================================================
    // ENDPOINT: submitVote
    // Share-weighted yes/no voting during the proposal's window.
    // A yes vote pins the member's highest_index_yes_vote, which
    // blocks rage-quit until that proposal is resolved.
    // ========================================================

    #[endpoint(submitVote)]
    fn submit_vote(&self, proposal_index: u64, vote: Vote) {
        let member_id = self.only_delegate();
        let mut member = self.members(&member_id).get();

        require!(
            proposal_index < self.proposal_queue_length().get(),
            "Proposal does not exist"
        );
        let mut proposal = self.proposals(proposal_index).get();

        require!(
            proposal.status != ProposalStatus::Aborted,
            "Proposal has been aborted"
        );
        let current_period = self.get_current_period();
        require!(
            current_period >= proposal.starting_period,
            "Voting period has not begun"
        );
        require!(
            !self.has_voting_period_expired(proposal.starting_period),
            "Voting period has expired"
        );
        require!(
            self.votes(proposal_index, &member_id).is_empty(),
            "Member has already voted"
        );

        self.votes(proposal_index, &member_id).set(vote);
        match vote {
            Vote::Null => sc_panic!("Vote must be either Yes or No"),
            Vote::Yes => {
                proposal.yes_votes += &member.shares;
                if proposal_index > member.highest_index_yes_vote {
                    member.highest_index_yes_vote = proposal_index;
                }
                let total_shares = self.total_shares().get();
                if total_shares > proposal.max_total_shares_at_yes_vote {
                    proposal.max_total_shares_at_yes_vote = total_shares;
                }
            }
            Vote::No => {
                proposal.no_votes += &member.shares;
            }
        }

        self.members(&member_id).set(&member);
        self.proposals(proposal_index).set(&proposal);

        self.vote_submitted_event(proposal_index, &member_id, vote);
    }

    // ========================================================
    // ENDPOINT: processProposal
    // After voting and grace periods elapse, anyone may tally the
    // proposal — strictly in queue order. The caller earns the
    // processing reward, funded from the proposer's deposit.
    // ========================================================

    #[endpoint(processProposal)]
    fn process_proposal(&self, proposal_index: u64) {
        require!(
            proposal_index < self.proposal_queue_length().get(),
            "Proposal does not exist"
        );
        let mut proposal = self.proposals(proposal_index).get();

        require!(
            self.get_current_period()
                >= proposal.starting_period
                    + self.voting_period_length().get()
                    + self.grace_period_length().get(),
            "Proposal is not ready to be processed"
        );
        require!(
            proposal.status == ProposalStatus::Submitted,
            "Proposal has already been processed"
        );
        if proposal_index > 0 {
            let previous = self.proposals(proposal_index - 1).get();
            require!(
                previous.status != ProposalStatus::Submitted,
                "Previous proposal must be processed"
            );
        }

        self.total_shares_requested()
            .update(|total| *total -= &proposal.shares_requested);

        let mut passed = proposal.yes_votes > proposal.no_votes;

        // Dilution bound: if mass rage-quits shrank the share pool to
        // less than 1/dilution_bound of what yes voters saw, fail the
        // proposal rather than over-dilute the remaining members.
        let diluted_shares = &self.total_shares().get() * &self.dilution_bound().get();
        if diluted_shares < proposal.max_total_shares_at_yes_vote {
            passed = false;
        }

        if passed {
            self.mint_shares(&proposal.applicant, &proposal.shares_requested);
            self.total_shares()
                .update(|total| *total += &proposal.shares_requested);
            self.bank_balance()
                .update(|balance| *balance += &proposal.token_tribute);
        } else {
            self.escrow_credit(&proposal.applicant, &proposal.token_tribute);
        }

        let deposit = self.proposal_deposit().get();
        let reward = self.processing_reward().get();
        self.escrow_credit(&proposal.proposer, &(&deposit - &reward));

        proposal.status = ProposalStatus::Processed;
        proposal.passed = passed;
        self.proposals(proposal_index).set(&proposal);

        let caller = self.blockchain().get_caller();
        if reward > 0u64 {
            self.send()
                .direct_esdt(&caller, &self.approved_token().get(), 0, &reward);
        }

        self.proposal_processed_event(proposal_index, &proposal.applicant, passed);
    }

    // ========================================================
    // ENDPOINT: abort
    // The applicant can withdraw a proposal before voting begins.
    // Tribute and the full deposit return to escrow.
    // ========================================================

    #[endpoint(abort)]
    fn abort(&self, proposal_index: u64) {
        require!(
            proposal_index < self.proposal_queue_length().get(),
            "Proposal does not exist"
        );
        let mut proposal = self.proposals(proposal_index).get();

        let caller = self.blockchain().get_caller();
        require!(
            caller == proposal.applicant,
            "Calling account is not the proposal applicant"
        );
        require!(
            proposal.status == ProposalStatus::Submitted,
            "Proposal has already been resolved"
        );
        require!(
            self.get_current_period() < proposal.starting_period,
            "Voting has already begun"
        );

        self.escrow_credit(&proposal.applicant, &proposal.token_tribute);
        self.escrow_credit(&proposal.proposer, &self.proposal_deposit().get());
        self.total_shares_requested()
            .update(|total| *total -= &proposal.shares_requested);

        proposal.status = ProposalStatus::Aborted;
        self.proposals(proposal_index).set(&proposal);

        self.proposal_aborted_event(proposal_index, &caller);
    }

    // ========================================================
    // ENDPOINT: rageQuit
    // Burn shares for a proportional slice of the guild bank.
    // Blocked while the member's highest yes-voted proposal is
    // still unresolved, so nobody exits ahead of funds a pending
    // proposal may commit.
    // ========================================================

    #[endpoint(rageQuit)]
    fn rage_quit(&self, shares_to_burn: BigUint) {
        let caller = self.blockchain().get_caller();
        require!(!self.members(&caller).is_empty(), "Account is not a member");
        let mut member = self.members(&caller).get();

        require!(shares_to_burn > 0u64, "Must burn at least one share");
        require!(
            member.shares >= shares_to_burn,
            "Not enough shares to be burned"
        );
        require!(
            self.proposal_resolved(member.highest_index_yes_vote),
            "Cannot rage quit until highest index yes vote is processed"
        );

        // Payout is computed against the pre-burn share total.
        let total_shares = self.total_shares().get();
        let payout = &self.bank_balance().get() * &shares_to_burn / total_shares;
        if payout == 0u64 {
            require!(self.allow_zero_payout().get(), "Zero payout");
        }

        member.shares -= &shares_to_burn;
        self.members(&caller).set(&member);
        self.total_shares().update(|total| *total -= &shares_to_burn);
        self.bank_balance().update(|balance| *balance -= &payout);

        if payout > 0u64 {
            self.send()
                .direct_esdt(&caller, &self.approved_token().get(), 0, &payout);
        }

        self.rage_quit_event(&caller, &shares_to_burn, &payout);
    }

    // ========================================================
    // ENDPOINT: updateDelegateKey
    // Members can point their voting authority at any address not
    // already claimed by a member or another delegate.
    // ========================================================

    #[endpoint(updateDelegateKey)]
    fn update_delegate_key(&self, new_delegate_key: ManagedAddress) {
        let caller = self.blockchain().get_caller();
        require!(!self.members(&caller).is_empty(), "Account is not a member");
        require!(
            !new_delegate_key.is_zero(),
            "Delegate key cannot be the zero address"
        );

        // No collision checks when resetting to the member's own address.
        if new_delegate_key != caller {
            require!(
                self.members(&new_delegate_key).is_empty(),
                "Cannot overwrite an existing member's address"
            );
            if !self.members_by_delegate_key(&new_delegate_key).is_empty() {
                let holder = self.members_by_delegate_key(&new_delegate_key).get();
                require!(
                    self.members(&holder).is_empty(),
                    "Cannot overwrite an existing delegate key"
                );
            }
        }

        let mut member = self.members(&caller).get();
        self.members_by_delegate_key(&member.delegate_key).clear();
        self.members_by_delegate_key(&new_delegate_key).set(&caller);
        member.delegate_key = new_delegate_key.clone();
        self.members(&caller).set(&member);

        self.delegate_key_updated_event(&caller, &new_delegate_key);
    }

    // ========================================================
    // INTERNAL: escrow ledger
    // Per-account balances held by the contract on behalf of
    // proposers and applicants, pending proposal resolution.
    // ========================================================

    fn escrow_credit(&self, account: &ManagedAddress, amount: &BigUint) {
        self.escrow_balance(account).update(|balance| *balance += amount);
    }

    fn escrow_debit(&self, account: &ManagedAddress, amount: &BigUint) {
        let balance = self.escrow_balance(account).get();
        require!(&balance >= amount, "Insufficient escrow balance");
        self.escrow_balance(account).set(&balance - amount);
    }

    // ========================================================
    // INTERNAL: membership ledger
    // ========================================================

    /// Adds shares to an existing member or creates a new member
    /// record with the applicant's own address as delegate key. If a
    /// sitting member squats the applicant's address as their delegate
    /// key, that member's key is forcibly reset to their own address.
    fn mint_shares(&self, applicant: &ManagedAddress, amount: &BigUint) {
        if !self.members(applicant).is_empty() {
            self.members(applicant)
                .update(|member| member.shares += amount);
            return;
        }

        if !self.members_by_delegate_key(applicant).is_empty() {
            let holder = self.members_by_delegate_key(applicant).get();
            if !self.members(&holder).is_empty() {
                self.members(&holder)
                    .update(|member| member.delegate_key = holder.clone());
                self.members_by_delegate_key(&holder).set(&holder);
            }
        }

        self.members(applicant).set(&Member {
            delegate_key: applicant.clone(),
            shares: amount.clone(),
            highest_index_yes_vote: 0,
        });
        self.members_by_delegate_key(applicant).set(applicant);
    }

    /// Resolves the caller to a member address through the delegate
    /// key mapping; aborts if the caller is not an active delegate.
    fn only_delegate(&self) -> ManagedAddress {
        let caller = self.blockchain().get_caller();
        require!(
            !self.members_by_delegate_key(&caller).is_empty(),
            "Account is not a delegate"
        );
        self.members_by_delegate_key(&caller).get()
    }

    /// True once the proposal at `index` is no longer awaiting
    /// processing. An empty queue means nothing can be pending.
    fn proposal_resolved(&self, index: u64) -> bool {
        if self.proposal_queue_length().get() == 0 {
            return true;
        }
        self.proposals(index).get().status != ProposalStatus::Submitted
    }

    // ========================================================
    // VIEWS — read-only queries
    // ========================================================

    /// Periods elapsed since summoning; pure function of the block
    /// timestamp, never cached.
    #[view(getCurrentPeriod)]
    fn get_current_period(&self) -> u64 {
        let elapsed = self.blockchain().get_block_timestamp() - self.summoning_time().get();
        elapsed / self.period_duration().get()
    }

    #[view(hasVotingPeriodExpired)]
    fn has_voting_period_expired(&self, starting_period: u64) -> bool {
        self.get_current_period() >= starting_period + self.voting_period_length().get()
    }

    #[view(getMemberProposalVote)]
    fn get_member_proposal_vote(
        &self,
        proposal_index: u64,
        member_id: ManagedAddress,
    ) -> Option<Vote> {
        require!(!self.members(&member_id).is_empty(), "Member does not exist");
        require!(
            proposal_index < self.proposal_queue_length().get(),
            "Proposal does not exist"
        );
        if self.votes(proposal_index, &member_id).is_empty() {
            None
        } else {
            Some(self.votes(proposal_index, &member_id).get())
        }
    }

    #[view(canRageQuit)]
    fn can_rage_quit(&self, highest_index_yes_vote: u64) -> bool {
        require!(
            highest_index_yes_vote < self.proposal_queue_length().get(),
            "Proposal does not exist"
        );
        self.proposal_resolved(highest_index_yes_vote)
    }

    #[view(getProposal)]
    fn get_proposal(&self, proposal_index: u64) -> Proposal<Self::Api> {
        require!(
            proposal_index < self.proposal_queue_length().get(),
            "Proposal does not exist"
        );
        self.proposals(proposal_index).get()
    }

    #[view(getMemberShares)]
    fn get_member_shares(&self, account: ManagedAddress) -> BigUint {
        if self.members(&account).is_empty() {
            BigUint::zero()
        } else {
            self.members(&account).get().shares
        }
    }

    #[view(getEscrowUserBalance)]
    fn get_escrow_user_balance(&self, account: ManagedAddress) -> BigUint {
        self.escrow_balance(&account).get()
    }

    // ========================================================
    // EVENTS
    // ========================================================

    #[event("summon")]
    fn summon_event(&self, #[indexed] summoner: &ManagedAddress);

    #[event("escrowDeposit")]
    fn escrow_deposit_event(&self, #[indexed] account: &ManagedAddress, amount: &BigUint);

    #[event("tributeSent")]
    fn tribute_sent_event(
        &self,
        #[indexed] sender: &ManagedAddress,
        #[indexed] applicant: &ManagedAddress,
        amount: &BigUint,
    );

    #[event("proposalSubmitted")]
    fn proposal_submitted_event(
        &self,
        #[indexed] proposal_index: u64,
        #[indexed] proposer: &ManagedAddress,
        #[indexed] applicant: &ManagedAddress,
        #[indexed] token_tribute: &BigUint,
        shares_requested: &BigUint,
    );

    #[event("voteSubmitted")]
    fn vote_submitted_event(
        &self,
        #[indexed] proposal_index: u64,
        #[indexed] member: &ManagedAddress,
        vote: Vote,
    );

    #[event("proposalProcessed")]
    fn proposal_processed_event(
        &self,
        #[indexed] proposal_index: u64,
        #[indexed] applicant: &ManagedAddress,
        passed: bool,
    );

    #[event("proposalAborted")]
    fn proposal_aborted_event(
        &self,
        #[indexed] proposal_index: u64,
        #[indexed] applicant: &ManagedAddress,
    );

    #[event("rageQuit")]
    fn rage_quit_event(
        &self,
        #[indexed] member: &ManagedAddress,
        #[indexed] shares_burned: &BigUint,
        payout: &BigUint,
    );

    #[event("delegateKeyUpdated")]
    fn delegate_key_updated_event(
        &self,
        #[indexed] member: &ManagedAddress,
        #[indexed] new_delegate_key: &ManagedAddress,
    );

    // ========================================================
    // STORAGE
    // ========================================================

    // ── Configuration (set at init, immutable) ──

    #[storage_mapper("approvedToken")]
    fn approved_token(&self) -> SingleValueMapper<TokenIdentifier>;

    #[storage_mapper("periodDuration")]
    fn period_duration(&self) -> SingleValueMapper<u64>;

    #[storage_mapper("votingPeriodLength")]
    fn voting_period_length(&self) -> SingleValueMapper<u64>;

    #[storage_mapper("gracePeriodLength")]
    fn grace_period_length(&self) -> SingleValueMapper<u64>;

    #[storage_mapper("proposalDeposit")]
    fn proposal_deposit(&self) -> SingleValueMapper<BigUint>;

    #[storage_mapper("dilutionBound")]
    fn dilution_bound(&self) -> SingleValueMapper<BigUint>;

    #[storage_mapper("processingReward")]
    fn processing_reward(&self) -> SingleValueMapper<BigUint>;

    #[storage_mapper("allowZeroPayout")]
    fn allow_zero_payout(&self) -> SingleValueMapper<bool>;

    #[storage_mapper("summoningTime")]
    fn summoning_time(&self) -> SingleValueMapper<u64>;

    // ── Membership ledger ──

    #[storage_mapper("members")]
    fn members(&self, account: &ManagedAddress) -> SingleValueMapper<Member<Self::Api>>;

    #[storage_mapper("membersByDelegateKey")]
    fn members_by_delegate_key(
        &self,
        delegate_key: &ManagedAddress,
    ) -> SingleValueMapper<ManagedAddress>;

    #[view(getTotalShares)]
    #[storage_mapper("totalShares")]
    fn total_shares(&self) -> SingleValueMapper<BigUint>;

    #[storage_mapper("totalSharesRequested")]
    fn total_shares_requested(&self) -> SingleValueMapper<BigUint>;

    // ── Proposal queue (append-only, 0-based) ──

    #[storage_mapper("proposals")]
    fn proposals(&self, index: u64) -> SingleValueMapper<Proposal<Self::Api>>;

    #[view(getProposalQueueLength)]
    #[storage_mapper("proposalQueueLength")]
    fn proposal_queue_length(&self) -> SingleValueMapper<u64>;

    #[storage_mapper("votes")]
    fn votes(&self, proposal_index: u64, member: &ManagedAddress) -> SingleValueMapper<Vote>;

    // ── Escrow ledger ──

    #[storage_mapper("escrowBalance")]
    fn escrow_balance(&self, account: &ManagedAddress) -> SingleValueMapper<BigUint>;

    // ── Guild bank ──

    #[view(getBankBalance)]
    #[storage_mapper("bankBalance")]
    fn bank_balance(&self) -> SingleValueMapper<BigUint>;
}
