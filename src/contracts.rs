//! Contract Definitions
//!
//! Solidity interfaces used by the monitor, defined with alloy's `sol!`
//! macro. `#[sol(rpc)]` generates contract instance types that make RPC
//! calls through any alloy Provider.

use alloy::sol;

// ── Uniswap V2 Pair ──────────────────────────────────────────────────
// The pair contract is also the LP token, so balanceOf lives here.

sol! {
    #[sol(rpc)]
    interface IUniswapV2Pair {
        function getReserves() external view returns (uint112 reserve0, uint112 reserve1, uint32 blockTimestampLast);
        function token0() external view returns (address);
        function token1() external view returns (address);
        function balanceOf(address owner) external view returns (uint256);
    }
}

// ── Uniswap V2 Router ────────────────────────────────────────────────

sol! {
    #[sol(rpc)]
    interface IUniswapV2Router02 {
        function addLiquidity(address tokenA, address tokenB, uint256 amountADesired, uint256 amountBDesired, uint256 amountAMin, uint256 amountBMin, address to, uint256 deadline) external returns (uint256 amountA, uint256 amountB, uint256 liquidity);
        function removeLiquidity(address tokenA, address tokenB, uint256 liquidity, uint256 amountAMin, uint256 amountBMin, address to, uint256 deadline) external returns (uint256 amountA, uint256 amountB);
    }
}
